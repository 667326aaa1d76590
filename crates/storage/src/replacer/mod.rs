pub mod lru_replacer;
pub mod replacer;
