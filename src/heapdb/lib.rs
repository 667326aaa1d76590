//! Heapdb stores each table as a heap file: an unordered sequence of fixed-size pages on disk,
//! scanned tuple by tuple through a page cache.
//!
//! The pieces live in their own crates and are re-exported here:
//!
//! * [`catalog`]: field types, tuple descriptors and the tuple codec.
//! * [`storage`]: pages, heap files, cursors and the buffer pool.
//! * [`error`]: the error type shared by all of them.
pub use heapdb_catalog as catalog;
pub use heapdb_error as error;
pub use heapdb_storage as storage;

pub use heapdb_error::{Error, Result};
