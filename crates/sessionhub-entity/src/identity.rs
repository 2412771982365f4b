//! Authenticated identity payload.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The identity a bearer token stands for.
///
/// Returned by `authenticate` (annotated with the freshly issued token)
/// and by every successful `resolve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User identifier.
    pub user_id: Uuid,
    /// Login name.
    pub username: String,
    /// Human-readable display name.
    pub display_name: Option<String>,
    /// Role the session was opened under.
    pub role: String,
    /// Tenant or workspace scope attached to the session.
    pub custom_space: Option<String>,
    /// Bearer token bound to this identity, once one has been issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Identity {
    /// Return a copy annotated with `token`.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}
