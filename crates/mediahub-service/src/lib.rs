//! # mediahub-service
//!
//! Business logic for MediaHub. [`FolderLifecycleManager`] keeps the folder
//! catalog and the directories on the media servers consistent by running
//! every create, rename and delete as a saga.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod folder;

pub use context::RequestContext;
pub use folder::{FolderLifecycleManager, FolderLocks, RenamedFolder, Saga, VideoPathRewriter};
