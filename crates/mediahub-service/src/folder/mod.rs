//! Folder lifecycle: sagas, per-folder locks, and video path rewriting.

pub mod lifecycle;
pub mod locks;
pub mod rewriter;
pub mod saga;

pub use lifecycle::{FolderLifecycleManager, RenamedFolder};
pub use locks::{FolderLockGuard, FolderLocks};
pub use rewriter::VideoPathRewriter;
pub use saga::Saga;
