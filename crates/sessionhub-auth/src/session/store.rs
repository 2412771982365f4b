//! Durable token store contract and its PostgreSQL implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use sessionhub_core::result::AppResult;
use sessionhub_database::repositories::AuthTokenRepository;
use sessionhub_entity::token::{AuthToken, CreateAuthToken};

/// Durable, authoritative storage for issued tokens, shared by every
/// service instance.
///
/// Each operation must be atomic with respect to a single record.
#[async_trait]
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    /// Fetch the record for `token`, if any.
    async fn fetch_by_token(&self, token: &str) -> AppResult<Option<AuthToken>>;

    /// Persist a new record. A token that collides with a live record is
    /// rejected with `Conflict`.
    ///
    /// Stores do not remember deleted tokens. A token is never issued twice
    /// because it carries at least 128 random bits.
    async fn save(&self, record: CreateAuthToken) -> AppResult<AuthToken>;

    /// Extend the expiry of `token`, only if its current expiry is later
    /// than `condition_after` and not later than `new_expires_at`.
    ///
    /// Returns whether a record was changed.
    async fn update_expires_at(
        &self,
        token: &str,
        condition_after: DateTime<Utc>,
        new_expires_at: DateTime<Utc>,
        new_last_updated_on: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Delete the record for `token`. Returns whether one existed.
    async fn delete_by_token(&self, token: &str) -> AppResult<bool>;

    /// Delete every record that expired before `before`. Returns the count.
    async fn delete_expired_tokens(&self, before: DateTime<Utc>) -> AppResult<u64>;
}

#[async_trait]
impl TokenStore for AuthTokenRepository {
    async fn fetch_by_token(&self, token: &str) -> AppResult<Option<AuthToken>> {
        self.find_by_token(token).await
    }

    async fn save(&self, record: CreateAuthToken) -> AppResult<AuthToken> {
        self.create(&record).await
    }

    async fn update_expires_at(
        &self,
        token: &str,
        condition_after: DateTime<Utc>,
        new_expires_at: DateTime<Utc>,
        new_last_updated_on: DateTime<Utc>,
    ) -> AppResult<bool> {
        AuthTokenRepository::update_expires_at(
            self,
            token,
            condition_after,
            new_expires_at,
            new_last_updated_on,
        )
        .await
    }

    async fn delete_by_token(&self, token: &str) -> AppResult<bool> {
        AuthTokenRepository::delete_by_token(self, token).await
    }

    async fn delete_expired_tokens(&self, before: DateTime<Utc>) -> AppResult<u64> {
        self.delete_expired(before).await
    }
}
