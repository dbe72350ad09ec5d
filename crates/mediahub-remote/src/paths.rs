//! Remote path construction.
//!
//! Every folder directory lives at `<content_root>/<owner_login>/<folder_name>`.
//! Both segments are validated here before any path reaches a command, so
//! neither can contain a separator, a traversal sequence, or a control
//! character.

use mediahub_core::result::AppResult;
use mediahub_entity::folder::validate_path_segment;

/// Builds absolute directory paths under a fixed content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePaths {
    content_root: String,
}

impl RemotePaths {
    /// Create a builder rooted at `content_root` (trailing slashes ignored).
    pub fn new(content_root: impl Into<String>) -> Self {
        let mut content_root = content_root.into();
        while content_root.len() > 1 && content_root.ends_with('/') {
            content_root.pop();
        }
        Self { content_root }
    }

    /// The configured content root.
    pub fn content_root(&self) -> &str {
        &self.content_root
    }

    /// `<root>/<login>`
    pub fn base_dir(&self, login: &str) -> AppResult<String> {
        validate_path_segment("Owner login", login)?;
        Ok(format!("{}/{}", self.content_root, login))
    }

    /// `<root>/<login>/<name>`
    pub fn folder_dir(&self, login: &str, name: &str) -> AppResult<String> {
        validate_path_segment("Folder name", name)?;
        Ok(format!("{}/{}", self.base_dir(login)?, name))
    }
}

/// The substring every video path and url of a folder carries:
/// `/<login>/<name>/`.
pub fn content_prefix(login: &str, name: &str) -> String {
    format!("/{login}/{name}/")
}
