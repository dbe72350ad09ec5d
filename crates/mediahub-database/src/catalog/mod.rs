//! The folder catalog contract.
//!
//! Every read and write is scoped by owner: a folder that exists but
//! belongs to someone else is indistinguishable from a missing one.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use mediahub_core::result::AppResult;
use mediahub_core::types::{FolderId, OwnerId};
use mediahub_entity::folder::{CreateFolder, Folder};
use mediahub_entity::video::{CreateVideo, Video};

pub use memory::{CatalogOp, MemoryFolderCatalog};
pub use postgres::PgFolderCatalog;

/// Video path prefix change that travels with a folder rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixRewrite<'a> {
    /// Prefix currently stored in video paths and urls.
    pub old: &'a str,
    /// Prefix to store instead.
    pub new: &'a str,
}

impl PrefixRewrite<'static> {
    /// Leave video paths alone.
    pub fn none() -> Self {
        Self { old: "", new: "" }
    }
}

impl PrefixRewrite<'_> {
    /// Whether applying this rewrite cannot change any row.
    pub fn is_noop(&self) -> bool {
        self.old.is_empty() || self.old == self.new
    }
}

/// Persistent store of folder and video records.
#[async_trait]
pub trait FolderCatalog: Send + Sync + std::fmt::Debug + 'static {
    /// Insert an active folder. Fails with `Conflict` if the owner already
    /// has an active folder with that name.
    async fn insert(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Delete the folder and all of its videos atomically. Returns `false`
    /// if there was nothing to delete.
    async fn delete(&self, owner_id: OwnerId, id: FolderId) -> AppResult<bool>;

    /// Change a folder's name and rewrite its video paths in one atomic
    /// write: either both land or neither does. Returns the renamed folder
    /// and the number of videos changed.
    async fn rename(
        &self,
        owner_id: OwnerId,
        id: FolderId,
        new_name: &str,
        videos: PrefixRewrite<'_>,
    ) -> AppResult<(Folder, u64)>;

    /// Active folder by id, if owned by `owner_id`.
    async fn find_by_owner_and_id(
        &self,
        owner_id: OwnerId,
        id: FolderId,
    ) -> AppResult<Option<Folder>>;

    /// Active folder by name.
    async fn find_by_owner_and_name(
        &self,
        owner_id: OwnerId,
        name: &str,
    ) -> AppResult<Option<Folder>>;

    /// All active folders of the owner, oldest first.
    async fn list_by_owner(&self, owner_id: OwnerId) -> AppResult<Vec<Folder>>;

    /// Add a video to an active folder of the same owner.
    async fn insert_video(&self, data: &CreateVideo) -> AppResult<Video>;

    /// Videos in a folder.
    async fn list_videos(&self, owner_id: OwnerId, folder_id: FolderId) -> AppResult<Vec<Video>>;

    /// Replace the first occurrence of `old_prefix` by `new_prefix` in the
    /// path and url of every video in the folder. Returns rows changed.
    async fn rewrite_video_prefix(
        &self,
        owner_id: OwnerId,
        folder_id: FolderId,
        old_prefix: &str,
        new_prefix: &str,
    ) -> AppResult<u64>;

    /// Whether the backing store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
