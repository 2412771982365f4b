//! Durable auth token record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An issued bearer token as held by the durable store.
///
/// Created on authenticate, mutated only by renewal (`expires_at`,
/// `last_updated_on`), destroyed on revoke or by the reclaimer.
/// `expires_at` never decreases while the record is alive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AuthToken {
    /// Store-assigned identifier.
    pub id: Uuid,
    /// Opaque bearer string. Unique, never reused.
    pub token: String,
    /// Owner of the session.
    pub user_id: Uuid,
    /// Role the session was opened under.
    pub role: String,
    /// Tenant or workspace scope.
    pub custom_space: Option<String>,
    /// Instant after which the token is no longer accepted.
    pub expires_at: DateTime<Utc>,
    /// Issue time.
    pub created_on: DateTime<Utc>,
    /// Time of the last expiry extension (or issue).
    pub last_updated_on: DateTime<Utc>,
}

impl AuthToken {
    /// Whether the token is still accepted at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Short prefix of the token, safe to log.
    pub fn fingerprint(&self) -> &str {
        fingerprint(&self.token)
    }
}

/// Data required to persist a new token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuthToken {
    /// Opaque bearer string.
    pub token: String,
    /// Owner of the session.
    pub user_id: Uuid,
    /// Role the session was opened under.
    pub role: String,
    /// Tenant or workspace scope.
    pub custom_space: Option<String>,
    /// Initial expiry.
    pub expires_at: DateTime<Utc>,
    /// Issue time; also the initial `last_updated_on`.
    pub issued_at: DateTime<Utc>,
}

/// First eight characters of a token, for log fields.
pub fn fingerprint(token: &str) -> &str {
    match token.char_indices().nth(8) {
        Some((idx, _)) => &token[..idx],
        None => token,
    }
}
