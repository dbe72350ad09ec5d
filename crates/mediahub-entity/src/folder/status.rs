//! Folder status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle marker of a folder record.
///
/// Mirrors the `folder_status` column type. Delete removes the row, so
/// nothing in MediaHub writes `Deleted`; the variant exists so rows marked
/// by hand or by older deployments still decode, and every catalog query
/// filters them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "folder_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FolderStatus {
    /// Folder is listed and can be renamed or deleted.
    Active,
    /// Folder is hidden from listings and cannot be renamed or deleted.
    Deleted,
}

impl FolderStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for FolderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FolderStatus {
    type Err = mediahub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "deleted" => Ok(Self::Deleted),
            _ => Err(mediahub_core::AppError::validation(format!(
                "Invalid folder status: '{s}'. Expected one of: active, deleted"
            ))),
        }
    }
}
