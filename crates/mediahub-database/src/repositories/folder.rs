//! Folder repository implementation.

use sqlx::PgPool;

use mediahub_core::error::{AppError, ErrorKind};
use mediahub_core::result::AppResult;
use mediahub_core::types::{FolderId, OwnerId};
use mediahub_entity::folder::{CreateFolder, Folder};

use crate::catalog::PrefixRewrite;
use crate::repositories::video::REWRITE_PREFIX_SQL;

/// Unique index over active `(owner_id, name)` pairs.
const OWNER_NAME_KEY: &str = "folders_owner_name_active_key";

/// Repository for owner-scoped folder queries.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an active folder by id, only if `owner_id` owns it.
    pub async fn find_by_owner_and_id(
        &self,
        owner_id: OwnerId,
        id: FolderId,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE id = $1 AND owner_id = $2 AND status = 'active'",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))
    }

    /// Find an active folder by name.
    pub async fn find_by_owner_and_name(
        &self,
        owner_id: OwnerId,
        name: &str,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 AND name = $2 AND status = 'active'",
        )
        .bind(owner_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find folder by name", e)
        })
    }

    /// List the owner's active folders, oldest first.
    pub async fn find_by_owner(&self, owner_id: OwnerId) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 AND status = 'active' \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list folders", e))
    }

    /// Insert a new active folder.
    pub async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (id, owner_id, server_id, name) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(data.id)
        .bind(data.owner_id)
        .bind(data.server_id)
        .bind(&data.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(OWNER_NAME_KEY) => {
                AppError::conflict(format!("Folder '{}' already exists", data.name))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create folder", e),
        })
    }

    /// Rename an active folder and rewrite its video paths in one
    /// transaction.
    ///
    /// Returns the renamed folder and the number of videos changed.
    pub async fn rename_with_videos(
        &self,
        owner_id: OwnerId,
        id: FolderId,
        new_name: &str,
        videos: PrefixRewrite<'_>,
    ) -> AppResult<(Folder, u64)> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let folder = sqlx::query_as::<_, Folder>(
            "UPDATE folders SET name = $3, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 AND status = 'active' RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .bind(new_name)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(OWNER_NAME_KEY) => {
                AppError::conflict(format!("Folder '{new_name}' already exists"))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to rename folder", e),
        })?
        .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;

        let changed = if videos.is_noop() {
            0
        } else {
            sqlx::query(REWRITE_PREFIX_SQL)
                .bind(id)
                .bind(owner_id)
                .bind(videos.old)
                .bind(videos.new)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to rewrite video paths", e)
                })?
                .rows_affected()
        };

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit folder rename", e)
        })?;

        Ok((folder, changed))
    }

    /// Delete the folder and every video in it in one transaction.
    ///
    /// Returns the number of videos removed, or `None` if the folder did
    /// not exist for this owner.
    pub async fn delete_with_videos(
        &self,
        owner_id: OwnerId,
        id: FolderId,
    ) -> AppResult<Option<u64>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let videos = sqlx::query("DELETE FROM videos WHERE folder_id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete folder videos", e)
            })?
            .rows_affected();

        let folders = sqlx::query("DELETE FROM folders WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete folder", e))?
            .rows_affected();

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit folder delete", e)
        })?;

        Ok((folders > 0).then_some(videos))
    }
}
