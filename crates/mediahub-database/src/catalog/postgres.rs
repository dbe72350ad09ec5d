//! PostgreSQL-backed folder catalog.

use async_trait::async_trait;

use mediahub_core::result::AppResult;
use mediahub_core::types::{FolderId, OwnerId};
use mediahub_entity::folder::{CreateFolder, Folder};
use mediahub_entity::video::{CreateVideo, Video};

use crate::pool::CatalogPool;
use crate::repositories::{FolderRepository, VideoRepository};

use super::{FolderCatalog, PrefixRewrite};

/// Folder catalog over the `folders` and `videos` tables.
#[derive(Debug, Clone)]
pub struct PgFolderCatalog {
    db: CatalogPool,
    folders: FolderRepository,
    videos: VideoRepository,
}

impl PgFolderCatalog {
    /// Create a catalog sharing the given pool.
    pub fn new(db: CatalogPool) -> Self {
        let pool = db.pool().clone();
        Self {
            folders: FolderRepository::new(pool.clone()),
            videos: VideoRepository::new(pool),
            db,
        }
    }
}

#[async_trait]
impl FolderCatalog for PgFolderCatalog {
    async fn insert(&self, data: &CreateFolder) -> AppResult<Folder> {
        self.folders.create(data).await
    }

    async fn delete(&self, owner_id: OwnerId, id: FolderId) -> AppResult<bool> {
        let removed = self.folders.delete_with_videos(owner_id, id).await?;
        if let Some(videos) = removed {
            tracing::debug!(folder_id = %id, videos, "Deleted folder record");
        }
        Ok(removed.is_some())
    }

    async fn rename(
        &self,
        owner_id: OwnerId,
        id: FolderId,
        new_name: &str,
        videos: PrefixRewrite<'_>,
    ) -> AppResult<(Folder, u64)> {
        self.folders
            .rename_with_videos(owner_id, id, new_name, videos)
            .await
    }

    async fn find_by_owner_and_id(
        &self,
        owner_id: OwnerId,
        id: FolderId,
    ) -> AppResult<Option<Folder>> {
        self.folders.find_by_owner_and_id(owner_id, id).await
    }

    async fn find_by_owner_and_name(
        &self,
        owner_id: OwnerId,
        name: &str,
    ) -> AppResult<Option<Folder>> {
        self.folders.find_by_owner_and_name(owner_id, name).await
    }

    async fn list_by_owner(&self, owner_id: OwnerId) -> AppResult<Vec<Folder>> {
        self.folders.find_by_owner(owner_id).await
    }

    async fn insert_video(&self, data: &CreateVideo) -> AppResult<Video> {
        self.videos.create(data).await
    }

    async fn list_videos(&self, owner_id: OwnerId, folder_id: FolderId) -> AppResult<Vec<Video>> {
        self.videos.find_by_folder(owner_id, folder_id).await
    }

    async fn rewrite_video_prefix(
        &self,
        owner_id: OwnerId,
        folder_id: FolderId,
        old_prefix: &str,
        new_prefix: &str,
    ) -> AppResult<u64> {
        self.videos
            .rewrite_prefix(owner_id, folder_id, old_prefix, new_prefix)
            .await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.db.is_ready().await
    }
}
