//! Owner value object and login derivation.

use serde::{Deserialize, Serialize};

use mediahub_core::result::AppResult;
use mediahub_core::types::OwnerId;

use crate::folder::validate_path_segment;

/// The authenticated account acting on its folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// Account identifier.
    pub id: OwnerId,
    /// Account email, when known.
    pub email: Option<String>,
}

impl Owner {
    /// Creates a new owner.
    pub fn new(id: OwnerId, email: Option<String>) -> Self {
        Self { id, email }
    }

    /// The directory name of this owner under the content root.
    ///
    /// The local part of the email, or `user_<id>` when there is no usable
    /// email. Stable for the lifetime of the account and never contains a
    /// path separator.
    pub fn login(&self) -> AppResult<String> {
        let login = self
            .email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .map(str::trim)
            .filter(|local| !local.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("user_{}", self.id));

        validate_path_segment("Owner login", &login)?;
        Ok(login)
    }
}
