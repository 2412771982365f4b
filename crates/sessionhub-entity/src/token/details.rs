//! Cached session details.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::Identity;

use super::model::AuthToken;

/// Derived, non-durable view of a live session held by the token cache.
///
/// Always reconstructable from the durable [`AuthToken`] plus the identity
/// payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDetails {
    /// Bearer string.
    pub token: String,
    /// Expiry as last seen by this instance.
    pub expires_at: DateTime<Utc>,
    /// Role the session was opened under.
    pub role: String,
    /// Identity payload returned to callers.
    pub identity: Identity,
    /// Last extension time as last seen by this instance.
    pub last_updated_on: DateTime<Utc>,
}

impl SessionDetails {
    /// Build cache details from a durable record and its identity.
    pub fn from_record(record: &AuthToken, identity: Identity) -> Self {
        Self {
            token: record.token.clone(),
            expires_at: record.expires_at,
            role: record.role.clone(),
            identity: identity.with_token(record.token.clone()),
            last_updated_on: record.last_updated_on,
        }
    }

    /// Whether the cached expiry is still in the future.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Adopt the expiry window of an authoritative record.
    pub fn adopt(&mut self, record: &AuthToken) {
        self.expires_at = record.expires_at;
        self.last_updated_on = record.last_updated_on;
    }
}
