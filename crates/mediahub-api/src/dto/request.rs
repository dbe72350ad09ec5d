//! Request DTOs.

use serde::{Deserialize, Serialize};

use mediahub_core::types::ServerId;

/// `POST /api/folders` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    /// Folder name.
    pub name: String,
    /// Target media server; defaults to the owner's current server.
    #[serde(default)]
    pub server_id: Option<ServerId>,
}

/// `PUT /api/folders/{id}` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameFolderRequest {
    /// New folder name.
    pub name: String,
}
