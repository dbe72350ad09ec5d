//! Validation of names that become remote path segments.

use mediahub_core::AppError;
use mediahub_core::result::AppResult;

/// Longest accepted segment in bytes (common filesystem `NAME_MAX`).
pub const MAX_SEGMENT_BYTES: usize = 255;

/// Check that `value` can be used verbatim as a single path segment.
///
/// `what` names the value in the error message ("Folder name", "Owner login").
pub fn validate_path_segment(what: &str, value: &str) -> AppResult<()> {
    if value.is_empty() {
        return Err(AppError::validation(format!("{what} is required")));
    }
    if value.len() > MAX_SEGMENT_BYTES {
        return Err(AppError::validation(format!(
            "{what} must be at most {MAX_SEGMENT_BYTES} bytes"
        )));
    }
    if value == "." || value == ".." {
        return Err(AppError::validation(format!("{what} cannot be '{value}'")));
    }
    if value.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
        return Err(AppError::validation(format!(
            "{what} cannot contain path separators or control characters"
        )));
    }
    Ok(())
}

/// Trim and validate a user-supplied folder name.
pub fn validate_folder_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    validate_path_segment("Folder name", name)?;
    Ok(name.to_string())
}
