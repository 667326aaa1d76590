use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock};

use heapdb_error::{errinput, Error};
use tracing::{debug, trace};

use crate::frame::PageFrame;
use crate::heap::heap_file::HeapFile;
use crate::lock::LockManager;
use crate::page::{heap_page::HeapPage, PageId, PAGE_SIZE};
use crate::replacer::{lru_replacer::LruReplacer, replacer::Replacer};
use crate::transaction::{AccessMode, TransactionId};
use crate::typedef::{FileId, FrameId};
use crate::Result;

/// The number of frames in a [`BufferPool`] built with [`BufferPool::default`].
pub const DEFAULT_POOL_SIZE: usize = 50;

/// Hands out pages on behalf of transactions, taking care of locking and caching.
///
/// This is the only way a [`crate::heap::HeapFileCursor`] gets at pages. A returned page stays
/// pinned for as long as the caller holds the `Arc`.
pub trait PageCache {
    fn fetch_page(
        &self,
        txn: TransactionId,
        page_id: PageId,
        mode: AccessMode,
    ) -> Result<Arc<HeapPage>>;
}

#[derive(Debug)]
struct PoolState {
    frames: Vec<PageFrame>,
    page_table: HashMap<PageId, FrameId>,
    replacer: Box<dyn Replacer>,
    free_list: VecDeque<FrameId>,
}

impl PoolState {
    /// Tells the replacer which frames are pinned. Pins are counted by handles to the page, so
    /// they change without the pool hearing about it.
    fn refresh_pins(&mut self) {
        for &frame_id in self.page_table.values() {
            if self.frames[frame_id].pin_count() == 0 {
                self.replacer.unpin(frame_id);
            } else {
                self.replacer.pin(frame_id);
            }
        }
    }

    /// Returns a free frame, evicting the least recently used unpinned page if necessary.
    fn free_frame(&mut self) -> Result<FrameId> {
        if let Some(frame_id) = self.free_list.pop_front() {
            return Ok(frame_id);
        }

        self.refresh_pins();
        let frame_id = self.replacer.evict().ok_or_else(|| {
            Error::BufferPoolError(format!(
                "all {} frames hold pinned pages",
                self.frames.len()
            ))
        })?;
        let frame = &mut self.frames[frame_id];
        if let Some(page_id) = frame.page_id() {
            debug!(%page_id, frame_id, "evicting page");
            self.page_table.remove(&page_id);
        }
        frame.reset();
        Ok(frame_id)
    }
}

/// A fixed number of page frames shared by every registered heap file.
///
/// Pages are read through their [`HeapFile`] on a miss and are never written back: a writer
/// updates the file with [`HeapFile::write_page`] and drops the stale copy with
/// [`BufferPool::discard_page`]. Every fetch first takes a page lock for the transaction, which
/// is held until [`BufferPool::transaction_complete`].
#[derive(Debug)]
pub struct BufferPool {
    state: Mutex<PoolState>,
    files: RwLock<HashMap<FileId, Arc<HeapFile>>>,
    lock_manager: LockManager,
    page_size: usize,
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::build(DEFAULT_POOL_SIZE, PAGE_SIZE, Box::new(LruReplacer::new()))
    }
}

impl BufferPool {
    /// Creates a pool of `pool_size` frames of `page_size` bytes with LRU eviction.
    pub fn new(pool_size: usize, page_size: usize) -> Result<Self> {
        Self::with_replacer(pool_size, page_size, Box::new(LruReplacer::new()))
    }

    pub fn with_replacer(
        pool_size: usize,
        page_size: usize,
        replacer: Box<dyn Replacer>,
    ) -> Result<Self> {
        if page_size == 0 {
            return errinput!("page size must be positive");
        }
        Ok(Self::build(pool_size, page_size, replacer))
    }

    fn build(pool_size: usize, page_size: usize, replacer: Box<dyn Replacer>) -> Self {
        let mut frames = Vec::with_capacity(pool_size);
        frames.resize_with(pool_size, PageFrame::new);
        Self {
            state: Mutex::new(PoolState {
                frames,
                page_table: HashMap::new(),
                replacer,
                free_list: (0..pool_size).collect(),
            }),
            files: RwLock::new(HashMap::new()),
            lock_manager: LockManager::new(),
            page_size,
        }
    }

    /// Makes `file` reachable through its id. Registering the same path twice with the same
    /// schema is a no-op.
    ///
    /// Fails if the file's page size differs from the pool's, if a different path already
    /// hashed to the same id, or if the path is registered under another schema.
    pub fn register_file(&self, file: Arc<HeapFile>) -> Result<()> {
        if file.page_size() != self.page_size {
            return errinput!(
                "heap file {} uses {} byte pages, the buffer pool {} byte pages",
                file.id(),
                file.page_size(),
                self.page_size
            );
        }
        let mut files = self.files.write()?;
        if let Some(existing) = files.get(&file.id()) {
            if existing.path() != file.path() {
                return errinput!(
                    "file id {} of {} is already taken by {}",
                    file.id(),
                    file.path().display(),
                    existing.path().display()
                );
            }
            if existing.schema() != file.schema() {
                return errinput!(
                    "heap file {} is registered with schema {}, not {}",
                    file.id(),
                    existing.schema(),
                    file.schema()
                );
            }
            return Ok(());
        }
        debug!(file_id = file.id(), path = %file.path().display(), "registered heap file");
        files.insert(file.id(), file);
        Ok(())
    }

    fn file(&self, file_id: FileId) -> Result<Arc<HeapFile>> {
        self.files
            .read()?
            .get(&file_id)
            .cloned()
            .ok_or(Error::UnknownFile(file_id))
    }

    /// Drops the cached copy of `page_id`, so the next fetch reads it from disk again.
    /// Does nothing if the page is not cached, and fails if someone still holds it.
    pub fn discard_page(&self, page_id: PageId) -> Result<()> {
        let mut state = self.state.lock()?;
        let Some(&frame_id) = state.page_table.get(&page_id) else {
            return Ok(());
        };
        let pin_count = state.frames[frame_id].pin_count();
        if pin_count > 0 {
            return Err(Error::BufferPoolError(format!(
                "page {} is pinned {} times and cannot be discarded",
                page_id, pin_count
            )));
        }
        state.page_table.remove(&page_id);
        state.replacer.remove(frame_id);
        state.frames[frame_id].reset();
        state.free_list.push_back(frame_id);
        debug!(%page_id, "discarded page");
        Ok(())
    }

    /// Ends `txn`, releasing all of its page locks.
    pub fn transaction_complete(&self, txn: TransactionId) -> Result<()> {
        self.lock_manager.release_all(txn)
    }

    pub fn lock_manager(&self) -> &LockManager {
        &self.lock_manager
    }

    pub fn capacity(&self) -> Result<usize> {
        Ok(self.state.lock()?.frames.len())
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Returns the number of pages currently cached.
    pub fn cached_page_count(&self) -> Result<usize> {
        Ok(self.state.lock()?.page_table.len())
    }

    pub fn contains_page(&self, page_id: PageId) -> Result<bool> {
        Ok(self.state.lock()?.page_table.contains_key(&page_id))
    }

    /// Returns the number of handles to `page_id` held outside the pool, or `None` if the page
    /// is not cached.
    pub fn pin_count(&self, page_id: PageId) -> Result<Option<usize>> {
        let state = self.state.lock()?;
        Ok(state
            .page_table
            .get(&page_id)
            .map(|&frame_id| state.frames[frame_id].pin_count()))
    }
}

impl PageCache for BufferPool {
    fn fetch_page(
        &self,
        txn: TransactionId,
        page_id: PageId,
        mode: AccessMode,
    ) -> Result<Arc<HeapPage>> {
        let file = self.file(page_id.file_id())?;
        self.lock_manager.acquire(txn, page_id, mode)?;

        let mut state = self.state.lock()?;
        if let Some(&frame_id) = state.page_table.get(&page_id) {
            let page = state.frames[frame_id].page().ok_or_else(|| {
                Error::BufferPoolError(format!("frame {} of page {} is empty", frame_id, page_id))
            })?;
            state.replacer.record_access(frame_id);
            state.replacer.pin(frame_id);
            trace!(%txn, %page_id, frame_id, "buffer pool hit");
            return Ok(page);
        }

        let frame_id = state.free_frame()?;
        let page = match file.read_page(page_id.page_number()) {
            Ok(page) => Arc::new(page),
            Err(e) => {
                state.free_list.push_back(frame_id);
                return Err(e);
            }
        };
        state.frames[frame_id].set_page(Arc::clone(&page));
        state.page_table.insert(page_id, frame_id);
        state.replacer.record_access(frame_id);
        state.replacer.pin(frame_id);
        debug!(%txn, %page_id, frame_id, "buffer pool miss");
        Ok(page)
    }
}
