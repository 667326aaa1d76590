use core::fmt;
use std::sync::Arc;

use crate::page::{heap_page::HeapPage, PageId};

/// A buffer pool slot holding at most one cached page.
///
/// Pages are handed out as `Arc<HeapPage>`, so the pin count of a frame is the number of
/// handles alive outside the pool.
#[derive(Default)]
pub(crate) struct PageFrame {
    page: Option<Arc<HeapPage>>,
}

impl fmt::Debug for PageFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageFrame")
            .field("page_id", &self.page_id())
            .field("pin_cnt", &self.pin_count())
            .finish()
    }
}

impl PageFrame {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the id of the cached page, if any.
    pub(crate) fn page_id(&self) -> Option<PageId> {
        self.page.as_ref().map(|page| page.id())
    }

    /// Returns a new handle to the cached page.
    pub(crate) fn page(&self) -> Option<Arc<HeapPage>> {
        self.page.clone()
    }

    /// Returns the number of handles to the page held outside the pool.
    pub(crate) fn pin_count(&self) -> usize {
        self.page
            .as_ref()
            .map_or(0, |page| Arc::strong_count(page) - 1)
    }

    pub(crate) fn set_page(&mut self, page: Arc<HeapPage>) {
        self.page = Some(page);
    }

    /// Empties the frame. Outstanding handles keep their page alive.
    pub(crate) fn reset(&mut self) {
        self.page = None;
    }
}
