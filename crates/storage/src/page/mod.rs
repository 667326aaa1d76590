use crate::typedef::{FileId, PageNumber};
pub mod heap_page;

/// The default page size. Every reader and writer of a heap file must agree on it.
pub const PAGE_SIZE: usize = 4096;

/// Addresses a page as `(file id, page number)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId {
    file_id: FileId,
    page_number: PageNumber,
}

impl PageId {
    pub const fn new(file_id: FileId, page_number: PageNumber) -> Self {
        Self {
            file_id,
            page_number,
        }
    }

    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    pub fn page_number(&self) -> PageNumber {
        self.page_number
    }

    /// The byte offset of this page in its file: page `n` spans `[n * size, (n + 1) * size)`.
    pub fn byte_offset(&self, page_size: usize) -> u64 {
        u64::from(self.page_number) * page_size as u64
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file_id, self.page_number)
    }
}
