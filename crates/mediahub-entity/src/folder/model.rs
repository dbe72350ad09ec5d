//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use mediahub_core::types::{FolderId, OwnerId, ServerId};

use super::status::FolderStatus;

/// A folder record. Its directory lives on `server_id` at
/// `<content_root>/<owner_login>/<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Catalog-assigned identifier.
    pub id: FolderId,
    /// The owning account.
    pub owner_id: OwnerId,
    /// The media server hosting the directory.
    pub server_id: ServerId,
    /// Display name, also the last path segment of the directory.
    pub name: String,
    /// Lifecycle marker.
    pub status: FolderStatus,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last renamed.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// The unsaved default folder shown to an owner with no folders yet.
    ///
    /// Its id is the nil UUID; it never exists in the catalog.
    pub fn placeholder(owner_id: OwnerId, login: &str, server_id: ServerId) -> Self {
        let now = Utc::now();
        Self {
            id: FolderId::from_uuid(Uuid::nil()),
            owner_id,
            server_id,
            name: login.to_string(),
            status: FolderStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this is the synthetic default folder.
    pub fn is_placeholder(&self) -> bool {
        self.id.as_uuid().is_nil()
    }

    /// Whether the folder is visible and mutable.
    pub fn is_active(&self) -> bool {
        self.status == FolderStatus::Active
    }
}

/// Data required to insert a new folder record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Id chosen by the caller, so the folder can be locked before the
    /// record exists.
    pub id: FolderId,
    /// The owning account.
    pub owner_id: OwnerId,
    /// The media server that will host the directory.
    pub server_id: ServerId,
    /// Validated folder name.
    pub name: String,
}
