use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use heapdb_catalog::schema::SchemaRef;
use heapdb_error::{errinput, Error};
use tracing::{debug, warn};

use crate::buffer_pool::PageCache;
use crate::heap::heap_file_cursor::HeapFileCursor;
use crate::page::heap_page::{checked_slots, HeapPage};
use crate::page::{PageId, PAGE_SIZE};
use crate::transaction::TransactionId;
use crate::typedef::{FileId, PageNumber};
use crate::Result;

/// A table stored as an unordered collection of fixed-size pages in a single file.
///
/// The file has no header: page `n` occupies bytes `[n * page_size, (n + 1) * page_size)`.
/// A `HeapFile` never keeps the file open. Each [`HeapFile::read_page`] and
/// [`HeapFile::write_page`] opens its own handle and drops it before returning, so the struct
/// is immutable and can be shared between threads as is. Concurrent reads and writes of the same
/// page are not ordered here; that is the page cache's job.
#[derive(Debug)]
pub struct HeapFile {
    id: FileId,
    path: PathBuf,
    schema: SchemaRef,
    page_size: usize,
}

impl HeapFile {
    /// Creates a heap file over `path` using the default [`PAGE_SIZE`]. The file itself is not
    /// touched; a missing file is an empty heap file.
    pub fn new(path: impl AsRef<Path>, schema: SchemaRef) -> Result<Self> {
        Self::with_page_size(path, schema, PAGE_SIZE)
    }

    /// Creates a heap file over `path` with `page_size` byte pages. At least one tuple of
    /// `schema` must fit in a page.
    pub fn with_page_size(
        path: impl AsRef<Path>,
        schema: SchemaRef,
        page_size: usize,
    ) -> Result<Self> {
        if page_size == 0 {
            return errinput!("page size must be positive");
        }
        checked_slots(page_size, &schema)?;
        let path = std::path::absolute(path.as_ref())?;
        Ok(Self {
            id: file_id_for(&path),
            path,
            schema,
            page_size,
        })
    }

    /// Returns the id of this file: a hash of its absolute path.
    ///
    /// The id is stable for the life of the process and the same for every `HeapFile` over the
    /// same path, in this process or another. Two different paths can collide, though; the
    /// [`crate::buffer_pool::BufferPool`] refuses to register a second file under a taken id.
    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Returns the number of pages in the file, counting a trailing partial page as a page.
    pub fn page_count(&self) -> Result<PageNumber> {
        let len = match std::fs::metadata(&self.path) {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => {
                return Err(Error::IO(format!(
                    "heap file {} ({}): {}",
                    self.id,
                    self.path.display(),
                    e
                )))
            }
        };
        Ok(PageNumber::try_from(len.div_ceil(self.page_size as u64))?)
    }

    /// Reads page `page_number` straight from disk.
    ///
    /// Fails with [`Error::ShortRead`] if the file ends before a full page was read, and with
    /// [`Error::IO`] if the file cannot be opened, positioned or read.
    pub fn read_page(&self, page_number: PageNumber) -> Result<HeapPage> {
        let page_id = PageId::new(self.id, page_number);
        let mut file = File::open(&self.path).map_err(|e| self.io_error(page_id, "open", e))?;
        file.seek(SeekFrom::Start(page_id.byte_offset(self.page_size)))
            .map_err(|e| self.io_error(page_id, "seek", e))?;

        let mut data = Vec::with_capacity(self.page_size);
        let read = (&mut file)
            .take(self.page_size as u64)
            .read_to_end(&mut data)
            .map_err(|e| self.io_error(page_id, "read", e))?;
        if read < self.page_size {
            warn!(file_id = self.id, page_number, read, "short page read");
            return Err(Error::ShortRead {
                file_id: self.id,
                page_number,
                expected: self.page_size,
                actual: read,
            });
        }

        debug!(file_id = self.id, page_number, "read page");
        HeapPage::new(page_id, data.into(), self.schema.clone())
    }

    /// Writes the full image of `page` at its offset, creating the file if needed. The page
    /// must belong to this file and be exactly one page long.
    pub fn write_page(&self, page: &HeapPage) -> Result<()> {
        let page_id = page.id();
        if page_id.file_id() != self.id {
            return errinput!("page {} does not belong to heap file {}", page_id, self.id);
        }
        let data = page.page_data();
        if data.len() != self.page_size {
            return errinput!(
                "page {} is {} bytes, heap file {} uses {} byte pages",
                page_id,
                data.len(),
                self.id,
                self.page_size
            );
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| self.io_error(page_id, "open", e))?;
        file.seek(SeekFrom::Start(page_id.byte_offset(self.page_size)))
            .map_err(|e| self.io_error(page_id, "seek", e))?;
        file.write_all(&data)
            .map_err(|e| self.io_error(page_id, "write", e))?;
        file.sync_data()
            .map_err(|e| self.io_error(page_id, "sync", e))?;

        debug!(
            file_id = self.id,
            page_number = page_id.page_number(),
            "wrote page"
        );
        Ok(())
    }

    /// Returns a cursor over every tuple in the file, fetching pages through `cache` on behalf
    /// of `txn`. Nothing is read until the cursor is opened.
    pub fn iterator<'a, C: PageCache>(
        &'a self,
        txn: TransactionId,
        cache: &'a C,
    ) -> HeapFileCursor<'a, C> {
        HeapFileCursor::new(self, txn, cache)
    }

    fn io_error(&self, page_id: PageId, op: &str, e: std::io::Error) -> Error {
        Error::IO(format!(
            "{} of page {} in heap file {} ({}): {}",
            op,
            page_id.page_number(),
            self.id,
            self.path.display(),
            e
        ))
    }
}

/// 32-bit FNV-1a over the path bytes. Deterministic, so ids survive restarts.
fn file_id_for(path: &Path) -> FileId {
    let mut hash = 0x811c_9dc5_u32;
    for &byte in path.as_os_str().as_encoded_bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}
