//! Heap files: tables stored as unordered collections of fixed-size pages, read through a page
//! cache that locks pages on behalf of transactions.
pub mod buffer_pool;
pub(crate) mod frame;
pub mod heap;
pub mod lock;
pub mod page;
pub mod replacer;
pub mod transaction;
pub mod typedef;

pub(crate) type Result<T> = std::result::Result<T, heapdb_error::Error>;
