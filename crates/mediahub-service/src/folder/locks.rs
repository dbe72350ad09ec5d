//! Per-folder mutual exclusion.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use mediahub_core::types::FolderId;

/// Lock table keyed by folder id.
///
/// At most one lifecycle operation holds a given folder at a time;
/// distinct folders never contend. Entries are dropped once nobody holds
/// or waits for them.
#[derive(Debug, Clone, Default)]
pub struct FolderLocks {
    locks: Arc<DashMap<FolderId, Arc<Mutex<()>>>>,
}

impl FolderLocks {
    /// Creates an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `folder_id`.
    pub async fn acquire(&self, folder_id: FolderId) -> FolderLockGuard {
        let lock = self.locks.entry(folder_id).or_default().clone();
        let guard = lock.lock_owned().await;
        FolderLockGuard {
            folder_id,
            guard: Some(guard),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Number of folders currently locked or awaited.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no folder is locked.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive access to one folder, released on drop.
#[derive(Debug)]
pub struct FolderLockGuard {
    folder_id: FolderId,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<DashMap<FolderId, Arc<Mutex<()>>>>,
}

impl FolderLockGuard {
    /// The folder this guard protects.
    pub fn folder_id(&self) -> FolderId {
        self.folder_id
    }
}

impl Drop for FolderLockGuard {
    fn drop(&mut self) {
        // Release first so the strong count reflects only waiters.
        drop(self.guard.take());
        self.locks
            .remove_if(&self.folder_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_entry_removed_after_release() {
        let locks = FolderLocks::new();
        let id = FolderId::new();

        let guard = locks.acquire(id).await;
        assert_eq!(guard.folder_id(), id);
        assert_eq!(locks.len(), 1);
        drop(guard);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_same_folder_is_exclusive() {
        let locks = FolderLocks::new();
        let id = FolderId::new();

        let guard = locks.acquire(id).await;
        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.acquire(id).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_distinct_folders_do_not_contend() {
        let locks = FolderLocks::new();
        let _a = locks.acquire(FolderId::new()).await;
        let b = tokio::time::timeout(Duration::from_millis(50), locks.acquire(FolderId::new())).await;
        assert!(b.is_ok());
    }
}
