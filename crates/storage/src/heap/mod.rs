pub mod heap_file;
pub mod heap_file_cursor;

pub use heap_file::HeapFile;
pub use heap_file_cursor::HeapFileCursor;
