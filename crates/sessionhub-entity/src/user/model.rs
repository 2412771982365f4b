//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::identity::Identity;

/// A registered account that can open sessions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Human-readable display name.
    pub display_name: Option<String>,
    /// Role the account may log in as.
    pub role: String,
    /// Tenant or workspace scope.
    pub custom_space: Option<String>,
    /// Whether the account may log in.
    pub active: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Identity payload for this user (no token attached).
    pub fn to_identity(&self) -> Identity {
        Identity {
            user_id: self.id,
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            role: self.role.clone(),
            custom_space: self.custom_space.clone(),
            token: None,
        }
    }
}
