//! Identity provider over a fixed set of accounts held in memory.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use sessionhub_core::error::AppError;
use sessionhub_core::result::AppResult;
use sessionhub_entity::identity::Identity;

use super::{INVALID_CREDENTIALS, IdentityProvider};

#[derive(Debug, Clone)]
struct Account {
    identity: Identity,
    secret: String,
}

/// Accounts registered up front with plaintext secrets.
///
/// For local development and tests; production uses
/// [`DatabaseIdentityProvider`](super::DatabaseIdentityProvider).
#[derive(Debug, Clone, Default)]
pub struct FixedIdentityProvider {
    accounts: HashMap<String, Account>,
}

impl FixedIdentityProvider {
    /// Creates a provider with no accounts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account. Usernames are matched case-insensitively.
    pub fn with_account(mut self, identity: Identity, secret: impl Into<String>) -> Self {
        self.accounts.insert(
            identity.username.to_lowercase(),
            Account {
                identity,
                secret: secret.into(),
            },
        );
        self
    }
}

#[async_trait]
impl IdentityProvider for FixedIdentityProvider {
    async fn validate(&self, identifier: &str, secret: &str, role: &str) -> AppResult<Identity> {
        match self.accounts.get(&identifier.to_lowercase()) {
            Some(account)
                if account.secret == secret && account.identity.role.eq_ignore_ascii_case(role) =>
            {
                Ok(account.identity.clone())
            }
            _ => Err(AppError::authentication(INVALID_CREDENTIALS)),
        }
    }

    async fn load(&self, user_id: Uuid, role: &str) -> AppResult<Option<Identity>> {
        Ok(self
            .accounts
            .values()
            .find(|a| a.identity.user_id == user_id)
            .map(|a| Identity {
                role: role.to_string(),
                ..a.identity.clone()
            }))
    }
}
