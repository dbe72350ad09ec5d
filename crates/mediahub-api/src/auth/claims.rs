//! JWT claims carrying the owner identity.

use serde::{Deserialize, Serialize};

use mediahub_core::types::OwnerId;
use mediahub_entity::owner::Owner;

/// Claims read from every bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerClaims {
    /// Subject: the owner id.
    pub sub: OwnerId,
    /// Owner email; its local part names the owner's directory.
    #[serde(default)]
    pub email: Option<String>,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl OwnerClaims {
    /// The owner these claims identify.
    pub fn owner(&self) -> Owner {
        Owner::new(self.sub, self.email.clone())
    }
}
