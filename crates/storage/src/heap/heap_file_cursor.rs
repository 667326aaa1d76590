use std::iter::Peekable;

use heapdb_catalog::tuple::Tuple;
use heapdb_error::Error;
use tracing::debug;

use crate::buffer_pool::PageCache;
use crate::heap::heap_file::HeapFile;
use crate::page::{heap_page::HeapPageIter, PageId};
use crate::transaction::{AccessMode, TransactionId};
use crate::typedef::PageNumber;
use crate::Result;

#[derive(Debug)]
enum CursorState {
    Unopened,
    /// Positioned on `page_number`. `tuples` is `None` once every page has been consumed.
    Open {
        page_number: PageNumber,
        tuples: Option<Peekable<HeapPageIter>>,
    },
    Closed,
}

/// A forward cursor over every tuple of a [`HeapFile`], page by page.
///
/// Pages are only ever obtained through the page cache the cursor was created with, in read-only
/// mode and on behalf of its transaction, so locking stays the cache's business. The cursor holds
/// at most one page at a time; moving past a page drops the cursor's handle to it.
///
/// A cursor is bound to a single transaction and is not meant to be shared between threads.
#[derive(Debug)]
pub struct HeapFileCursor<'a, C: PageCache> {
    file: &'a HeapFile,
    txn: TransactionId,
    cache: &'a C,
    state: CursorState,
}

impl<'a, C: PageCache> HeapFileCursor<'a, C> {
    pub(crate) fn new(file: &'a HeapFile, txn: TransactionId, cache: &'a C) -> Self {
        Self {
            file,
            txn,
            cache,
            state: CursorState::Unopened,
        }
    }

    /// Positions the cursor before the first tuple of page 0, fetching that page.
    ///
    /// Fails with [`Error::PageNotFound`] if the file has no pages; the cursor is then left in
    /// the state it was in.
    pub fn open(&mut self) -> Result<()> {
        if self.file.page_count()? == 0 {
            return Err(Error::PageNotFound {
                file_id: self.file.id(),
                page_number: 0,
            });
        }
        let tuples = fetch_tuples(self.file, self.txn, self.cache, 0)?;
        self.state = CursorState::Open {
            page_number: 0,
            tuples: Some(tuples),
        };
        Ok(())
    }

    /// Returns whether another tuple is available, moving on to later pages as needed.
    ///
    /// Calling it repeatedly has no effect beyond that page movement. Returns `false` on a
    /// cursor that was never opened or has been closed.
    pub fn has_next(&mut self) -> Result<bool> {
        let Self {
            file,
            txn,
            cache,
            state,
        } = self;
        let CursorState::Open {
            page_number,
            tuples,
        } = state
        else {
            return Ok(false);
        };

        loop {
            let Some(current) = tuples.as_mut() else {
                return Ok(false);
            };
            if current.peek().is_some() {
                return Ok(true);
            }

            let next_page = *page_number + 1;
            if next_page >= file.page_count()? {
                // Done. Let go of the last page.
                *tuples = None;
                return Ok(false);
            }
            *tuples = Some(fetch_tuples(*file, *txn, *cache, next_page)?);
            *page_number = next_page;
        }
    }

    /// Returns the next tuple. Fails with [`Error::Exhausted`] when [`Self::has_next`] would
    /// return `false`.
    pub fn next(&mut self) -> Result<Tuple> {
        if !self.has_next()? {
            return Err(Error::Exhausted);
        }
        match &mut self.state {
            CursorState::Open {
                tuples: Some(tuples),
                ..
            } => tuples.next().ok_or(Error::Exhausted),
            _ => Err(Error::Exhausted),
        }
    }

    /// Starts over from the first tuple of page 0, fetching the page again.
    pub fn rewind(&mut self) -> Result<()> {
        self.close();
        self.open()
    }

    /// Releases the current page. Safe to call in any state, any number of times.
    pub fn close(&mut self) {
        self.state = CursorState::Closed;
    }
}

impl<C: PageCache> Iterator for HeapFileCursor<'_, C> {
    type Item = Result<Tuple>;

    /// Yields the remaining tuples of an open cursor. A cursor that is not open yields nothing.
    ///
    /// An error is yielded once, after which the cursor is closed and the iterator ends. Callers
    /// that want to retry a failed page fetch use [`HeapFileCursor::has_next`] directly, which
    /// leaves the cursor where it was.
    fn next(&mut self) -> Option<Self::Item> {
        match self.has_next() {
            Ok(true) => Some(HeapFileCursor::next(self)),
            Ok(false) => None,
            Err(e) => {
                self.close();
                Some(Err(e))
            }
        }
    }
}

fn fetch_tuples<C: PageCache>(
    file: &HeapFile,
    txn: TransactionId,
    cache: &C,
    page_number: PageNumber,
) -> Result<Peekable<HeapPageIter>> {
    let page_id = PageId::new(file.id(), page_number);
    debug!(%txn, %page_id, "cursor advancing to page");
    let page = cache.fetch_page(txn, page_id, AccessMode::ReadOnly)?;
    Ok(page.into_tuples().peekable())
}
