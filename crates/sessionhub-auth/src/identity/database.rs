//! Identity provider backed by the `users` table.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use sessionhub_core::error::AppError;
use sessionhub_core::result::AppResult;
use sessionhub_database::repositories::UserRepository;
use sessionhub_entity::identity::Identity;

use super::{INVALID_CREDENTIALS, IdentityProvider};
use crate::password::PasswordHasher;

/// Checks usernames and Argon2 password hashes stored in PostgreSQL.
#[derive(Debug, Clone)]
pub struct DatabaseIdentityProvider {
    users: Arc<UserRepository>,
    hasher: PasswordHasher,
}

impl DatabaseIdentityProvider {
    /// Creates a provider over the given repository.
    pub fn new(users: Arc<UserRepository>) -> Self {
        Self {
            users,
            hasher: PasswordHasher::new(),
        }
    }
}

#[async_trait]
impl IdentityProvider for DatabaseIdentityProvider {
    async fn validate(&self, identifier: &str, secret: &str, role: &str) -> AppResult<Identity> {
        let user = self
            .users
            .find_by_username(identifier)
            .await?
            .ok_or_else(|| AppError::authentication(INVALID_CREDENTIALS))?;

        if !user.active {
            debug!(user_id = %user.id, "Login attempt for disabled account");
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        }

        if !self.hasher.verify_password(secret, &user.password_hash)? {
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        }

        if !user.role.eq_ignore_ascii_case(role) {
            debug!(user_id = %user.id, requested = role, "Role not granted to account");
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        }

        Ok(user.to_identity())
    }

    async fn load(&self, user_id: Uuid, role: &str) -> AppResult<Option<Identity>> {
        let user = self.users.find_by_id(user_id).await?;

        Ok(user.filter(|u| u.active).map(|u| Identity {
            role: role.to_string(),
            ..u.to_identity()
        }))
    }
}
