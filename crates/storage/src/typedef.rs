/// Identifies a heap file. Derived from the file's absolute path, see
/// [`crate::heap::heap_file::HeapFile::id`].
pub type FileId = u32;
/// The zero-based index of a page inside its heap file.
pub type PageNumber = u32;
/// Index of a frame in the buffer pool.
pub type FrameId = usize;
