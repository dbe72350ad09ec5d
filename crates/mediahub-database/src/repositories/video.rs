//! Video repository implementation.

use sqlx::PgPool;

use mediahub_core::error::{AppError, ErrorKind};
use mediahub_core::result::AppResult;
use mediahub_core::types::{FolderId, OwnerId};
use mediahub_entity::video::{CreateVideo, Video};

/// First-occurrence prefix replacement in `path` and `url`, limited to rows
/// that contain the prefix. Binds: folder id, owner id, old, new.
pub(crate) const REWRITE_PREFIX_SQL: &str = "UPDATE videos SET \
        path = CASE WHEN strpos(path, $3) > 0 \
            THEN overlay(path placing $4 from strpos(path, $3) for char_length($3)) \
            ELSE path END, \
        url = CASE WHEN strpos(url, $3) > 0 \
            THEN overlay(url placing $4 from strpos(url, $3) for char_length($3)) \
            ELSE url END, \
        updated_at = NOW() \
     WHERE folder_id = $1 AND owner_id = $2 \
       AND (strpos(path, $3) > 0 OR strpos(url, $3) > 0)";

/// Repository for videos inside folders.
#[derive(Debug, Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    /// Create a new video repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a video into an active folder owned by the same owner.
    pub async fn create(&self, data: &CreateVideo) -> AppResult<Video> {
        sqlx::query_as::<_, Video>(
            "INSERT INTO videos (owner_id, folder_id, name, path, url) \
             SELECT $1, $2, $3, $4, $5 \
             WHERE EXISTS ( \
                SELECT 1 FROM folders WHERE id = $2 AND owner_id = $1 AND status = 'active' \
             ) RETURNING *",
        )
        .bind(data.owner_id)
        .bind(data.folder_id)
        .bind(&data.name)
        .bind(&data.path)
        .bind(&data.url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create video", e))?
        .ok_or_else(|| AppError::not_found(format!("Folder {} not found", data.folder_id)))
    }

    /// List the videos in a folder.
    pub async fn find_by_folder(
        &self,
        owner_id: OwnerId,
        folder_id: FolderId,
    ) -> AppResult<Vec<Video>> {
        sqlx::query_as::<_, Video>(
            "SELECT * FROM videos WHERE folder_id = $1 AND owner_id = $2 ORDER BY created_at ASC",
        )
        .bind(folder_id)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list videos", e))
    }

    /// Replace the first occurrence of `old_prefix` with `new_prefix` in the
    /// path and url of every video in the folder. Rows containing neither
    /// are left untouched. Returns the number of rows changed.
    pub async fn rewrite_prefix(
        &self,
        owner_id: OwnerId,
        folder_id: FolderId,
        old_prefix: &str,
        new_prefix: &str,
    ) -> AppResult<u64> {
        if old_prefix.is_empty() || old_prefix == new_prefix {
            return Ok(0);
        }

        let result = sqlx::query(REWRITE_PREFIX_SQL)
            .bind(folder_id)
            .bind(owner_id)
            .bind(old_prefix)
            .bind(new_prefix)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to rewrite video paths", e)
            })?;

        Ok(result.rows_affected())
    }
}
