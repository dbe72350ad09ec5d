//! Video entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use mediahub_core::types::{FolderId, OwnerId, VideoId};

/// A video stored inside a folder.
///
/// Both `path` and `url` embed the folder's path segment
/// (`/<owner_login>/<folder_name>/`), which is rewritten on folder rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Video {
    /// Unique video identifier.
    pub id: VideoId,
    /// The owning account (always the folder's owner).
    pub owner_id: OwnerId,
    /// The containing folder.
    pub folder_id: FolderId,
    /// File name including extension.
    pub name: String,
    /// Filesystem path on the media server.
    pub path: String,
    /// Playback URL.
    pub url: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to insert a video record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVideo {
    /// The owning account.
    pub owner_id: OwnerId,
    /// The containing folder.
    pub folder_id: FolderId,
    /// File name.
    pub name: String,
    /// Filesystem path on the media server.
    pub path: String,
    /// Playback URL.
    pub url: String,
}
