use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use heapdb_error::Error;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use tracing::{trace, warn};

use crate::page::PageId;
use crate::transaction::{AccessMode, TransactionId};
use crate::Result;

/// A page lock held by one transaction. Dropping it releases the lock.
#[derive(Debug)]
enum PageLock {
    Shared { _guard: OwnedRwLockReadGuard<()> },
    Exclusive { _guard: OwnedRwLockWriteGuard<()> },
}

impl PageLock {
    fn mode(&self) -> AccessMode {
        match self {
            PageLock::Shared { .. } => AccessMode::ReadOnly,
            PageLock::Exclusive { .. } => AccessMode::ReadWrite,
        }
    }
}

#[derive(Debug, Default)]
struct LockTable {
    /// One read-write lock per page that is, or recently was, locked.
    locks: HashMap<PageId, Arc<RwLock<()>>>,
    /// The locks each transaction holds, by page.
    held: HashMap<TransactionId, HashMap<PageId, PageLock>>,
}

/// Page-level shared/exclusive locks, held until the owning transaction completes.
///
/// Requests never wait: a request that conflicts with another transaction's lock fails with
/// [`Error::LockConflict`] and the caller decides whether to abort or retry.
#[derive(Debug, Default)]
pub struct LockManager {
    table: Mutex<LockTable>,
}

impl LockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires a lock on `page_id` for `txn` in `mode`. Re-requesting a held lock is a no-op,
    /// and a shared lock is upgraded to exclusive when `txn` is its only holder.
    pub fn acquire(&self, txn: TransactionId, page_id: PageId, mode: AccessMode) -> Result<()> {
        let mut table = self.table.lock()?;
        let lock = Arc::clone(
            table
                .locks
                .entry(page_id)
                .or_insert_with(|| Arc::new(RwLock::new(()))),
        );
        let held = table.held.entry(txn).or_default();

        let acquired = match (held.get(&page_id).map(PageLock::mode), mode) {
            (Some(AccessMode::ReadWrite), _) | (Some(AccessMode::ReadOnly), AccessMode::ReadOnly) => {
                return Ok(())
            }
            (Some(AccessMode::ReadOnly), AccessMode::ReadWrite) => {
                // Give up our shared lock, then try to take the page exclusively.
                held.remove(&page_id);
                match Arc::clone(&lock).try_write_owned() {
                    Ok(_guard) => Some(PageLock::Exclusive { _guard }),
                    Err(_) => {
                        // Only readers can be holding it, so the shared lock is ours again.
                        if let Ok(_guard) = lock.try_read_owned() {
                            held.insert(page_id, PageLock::Shared { _guard });
                        }
                        None
                    }
                }
            }
            (None, AccessMode::ReadOnly) => lock
                .try_read_owned()
                .ok()
                .map(|_guard| PageLock::Shared { _guard }),
            (None, AccessMode::ReadWrite) => lock
                .try_write_owned()
                .ok()
                .map(|_guard| PageLock::Exclusive { _guard }),
        };

        match acquired {
            Some(page_lock) => {
                trace!(%txn, %page_id, ?mode, "page lock acquired");
                held.insert(page_id, page_lock);
                Ok(())
            }
            None => {
                warn!(%txn, %page_id, ?mode, "page lock conflict");
                Err(Error::LockConflict {
                    file_id: page_id.file_id(),
                    page_number: page_id.page_number(),
                })
            }
        }
    }

    /// Returns the mode in which `txn` holds `page_id`, if it holds it at all.
    pub fn holds_lock(&self, txn: TransactionId, page_id: PageId) -> Result<Option<AccessMode>> {
        let table = self.table.lock()?;
        Ok(table
            .held
            .get(&txn)
            .and_then(|locks| locks.get(&page_id))
            .map(PageLock::mode))
    }

    /// Releases every lock `txn` holds.
    pub fn release_all(&self, txn: TransactionId) -> Result<()> {
        let mut table = self.table.lock()?;
        if let Some(locks) = table.held.remove(&txn) {
            trace!(%txn, count = locks.len(), "releasing page locks");
        }
        // Forget locks nobody holds anymore; the table's own reference is the last one.
        table.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::LockManager;
    use crate::page::PageId;
    use crate::transaction::{AccessMode, TransactionId};
    use heapdb_error::Error;

    const PAGE: PageId = PageId::new(1, 0);

    #[test]
    fn test_shared_locks_coexist() {
        let locks = LockManager::new();
        let (t1, t2) = (TransactionId::new(), TransactionId::new());

        locks.acquire(t1, PAGE, AccessMode::ReadOnly).unwrap();
        locks.acquire(t2, PAGE, AccessMode::ReadOnly).unwrap();
        // Asking again is a no-op.
        locks.acquire(t1, PAGE, AccessMode::ReadOnly).unwrap();

        assert_eq!(locks.holds_lock(t1, PAGE), Ok(Some(AccessMode::ReadOnly)));
        assert_eq!(locks.holds_lock(t2, PAGE), Ok(Some(AccessMode::ReadOnly)));
    }

    #[test]
    fn test_exclusive_conflicts() {
        let locks = LockManager::new();
        let (t1, t2) = (TransactionId::new(), TransactionId::new());

        locks.acquire(t1, PAGE, AccessMode::ReadWrite).unwrap();
        let conflict = Err(Error::LockConflict {
            file_id: 1,
            page_number: 0,
        });
        assert_eq!(locks.acquire(t2, PAGE, AccessMode::ReadOnly), conflict);
        assert_eq!(locks.acquire(t2, PAGE, AccessMode::ReadWrite), conflict);

        // The holder can still read its own page.
        locks.acquire(t1, PAGE, AccessMode::ReadOnly).unwrap();
        assert_eq!(locks.holds_lock(t1, PAGE), Ok(Some(AccessMode::ReadWrite)));

        // Once released, the page is free for others.
        locks.release_all(t1).unwrap();
        assert_eq!(locks.holds_lock(t1, PAGE), Ok(None));
        locks.acquire(t2, PAGE, AccessMode::ReadWrite).unwrap();
    }

    #[test]
    fn test_shared_lock_held_until_released() {
        let locks = LockManager::new();
        let (reader, writer) = (TransactionId::new(), TransactionId::new());

        locks.acquire(reader, PAGE, AccessMode::ReadOnly).unwrap();
        assert!(matches!(
            locks.acquire(writer, PAGE, AccessMode::ReadWrite),
            Err(Error::LockConflict { .. })
        ));
        assert_eq!(locks.holds_lock(writer, PAGE), Ok(None));

        locks.release_all(reader).unwrap();
        locks.acquire(writer, PAGE, AccessMode::ReadWrite).unwrap();
        assert_eq!(locks.holds_lock(writer, PAGE), Ok(Some(AccessMode::ReadWrite)));
    }

    #[test]
    fn test_upgrade() {
        let locks = LockManager::new();
        let (t1, t2) = (TransactionId::new(), TransactionId::new());

        // A sole reader can upgrade.
        locks.acquire(t1, PAGE, AccessMode::ReadOnly).unwrap();
        locks.acquire(t1, PAGE, AccessMode::ReadWrite).unwrap();
        assert_eq!(locks.holds_lock(t1, PAGE), Ok(Some(AccessMode::ReadWrite)));
        locks.release_all(t1).unwrap();

        // With a second reader the upgrade fails, and the shared lock is kept.
        locks.acquire(t1, PAGE, AccessMode::ReadOnly).unwrap();
        locks.acquire(t2, PAGE, AccessMode::ReadOnly).unwrap();
        assert!(matches!(
            locks.acquire(t1, PAGE, AccessMode::ReadWrite),
            Err(Error::LockConflict { .. })
        ));
        assert_eq!(locks.holds_lock(t1, PAGE), Ok(Some(AccessMode::ReadOnly)));
    }
}
