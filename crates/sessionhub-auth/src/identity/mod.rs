//! Identity providers: credential verification and identity reloads.

pub mod database;
pub mod fixed;

use async_trait::async_trait;
use uuid::Uuid;

use sessionhub_core::result::AppResult;
use sessionhub_entity::identity::Identity;

pub use database::DatabaseIdentityProvider;
pub use fixed::FixedIdentityProvider;

/// Verifies credentials and rebuilds identities for resolved tokens.
#[async_trait]
pub trait IdentityProvider: Send + Sync + std::fmt::Debug {
    /// Verify `secret` for `identifier` under `role`.
    ///
    /// Returns `Authentication` on any credential failure.
    async fn validate(&self, identifier: &str, secret: &str, role: &str) -> AppResult<Identity>;

    /// Rebuild the identity of a token owner, or `None` if the account is
    /// gone or disabled.
    async fn load(&self, user_id: Uuid, role: &str) -> AppResult<Option<Identity>>;
}

/// Message returned for every credential failure, so callers cannot tell
/// which check failed.
pub(crate) const INVALID_CREDENTIALS: &str = "Invalid username or password";
