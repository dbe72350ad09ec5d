//! Typed path parameter helpers.

use mediahub_core::error::AppError;
use mediahub_core::types::FolderId;

/// Parses a folder id from a path segment.
pub fn parse_folder_id(s: &str) -> Result<FolderId, AppError> {
    s.parse()
        .map_err(|_| AppError::validation(format!("Invalid folder id: {s}")))
}
