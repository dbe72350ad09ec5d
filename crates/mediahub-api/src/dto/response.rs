//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mediahub_core::types::{FolderId, ServerId};
use mediahub_entity::folder::Folder;
use mediahub_service::RenamedFolder;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// A folder as shown to its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderResponse {
    /// Folder id (nil for the unsaved default folder).
    pub id: FolderId,
    /// Folder name.
    pub name: String,
    /// Hosting media server.
    pub server_id: ServerId,
    /// Whether this is the unsaved default folder.
    pub is_default: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<Folder> for FolderResponse {
    fn from(folder: Folder) -> Self {
        Self {
            is_default: folder.is_placeholder(),
            id: folder.id,
            name: folder.name,
            server_id: folder.server_id,
            created_at: folder.created_at,
        }
    }
}

/// Result of a rename.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameFolderResponse {
    /// Renamed folder.
    pub id: FolderId,
    /// Previous name.
    pub old_name: String,
    /// Current name.
    pub new_name: String,
}

impl From<RenamedFolder> for RenameFolderResponse {
    fn from(r: RenamedFolder) -> Self {
        Self {
            id: r.folder_id,
            old_name: r.old_name,
            new_name: r.new_name,
        }
    }
}

/// Result of a delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFolderResponse {
    /// Deleted folder.
    pub id: FolderId,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Seconds since start.
    pub uptime_seconds: u64,
    /// Catalog reachability.
    pub database: String,
    /// Remote command transport.
    pub transport: String,
}
