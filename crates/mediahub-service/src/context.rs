//! Request context carrying the authenticated owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mediahub_core::result::AppResult;
use mediahub_core::types::OwnerId;
use mediahub_entity::owner::Owner;

/// Context for the current authenticated request.
///
/// Built by the API layer from the bearer token and passed into service
/// methods so that every operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated owner.
    pub owner: Owner,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(owner: Owner) -> Self {
        Self {
            owner,
            request_time: Utc::now(),
        }
    }

    /// The acting owner's id.
    pub fn owner_id(&self) -> OwnerId {
        self.owner.id
    }

    /// The acting owner's directory name under the content root.
    pub fn login(&self) -> AppResult<String> {
        self.owner.login()
    }
}
