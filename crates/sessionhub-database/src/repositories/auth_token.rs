//! Auth token repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use sessionhub_core::error::{AppError, ErrorKind};
use sessionhub_core::result::AppResult;
use sessionhub_entity::token::{AuthToken, CreateAuthToken};

/// Repository for the `auth_tokens` table.
///
/// Every mutation is a single statement, so concurrent request handlers
/// and the reclaimer never interleave within one record.
#[derive(Debug, Clone)]
pub struct AuthTokenRepository {
    pool: PgPool,
}

impl AuthTokenRepository {
    /// Create a new auth token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a token record by its bearer string.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<AuthToken>> {
        sqlx::query_as::<_, AuthToken>("SELECT * FROM auth_tokens WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find token", e))
    }

    /// Insert a new token record.
    ///
    /// A duplicate bearer string is reported as `Conflict`.
    pub async fn create(&self, data: &CreateAuthToken) -> AppResult<AuthToken> {
        sqlx::query_as::<_, AuthToken>(
            "INSERT INTO auth_tokens (token, user_id, role, custom_space, expires_at, created_on, last_updated_on) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING *",
        )
        .bind(&data.token)
        .bind(data.user_id)
        .bind(&data.role)
        .bind(&data.custom_space)
        .bind(data.expires_at)
        .bind(data.issued_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let duplicate = matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation());
            if duplicate {
                AppError::with_source(ErrorKind::Conflict, "Token already issued", e)
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create token", e)
            }
        })
    }

    /// Extend a token's expiry if it is still alive after `condition_after`.
    ///
    /// The update never shortens an existing expiry. Returns `false` when no
    /// row matched (revoked, expired, or already extended further).
    pub async fn update_expires_at(
        &self,
        token: &str,
        condition_after: DateTime<Utc>,
        new_expires_at: DateTime<Utc>,
        new_last_updated_on: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE auth_tokens SET expires_at = $3, last_updated_on = $4 \
             WHERE token = $1 AND expires_at > $2 AND expires_at <= $3",
        )
        .bind(token)
        .bind(condition_after)
        .bind(new_expires_at)
        .bind(new_last_updated_on)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to extend token", e))?;

        Ok(result.rows_affected() == 1)
    }

    /// Delete a token by its bearer string. Returns `true` if a row was removed.
    pub async fn delete_by_token(&self, token: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete token", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Bulk-delete every token whose expiry is strictly before `before`.
    pub async fn delete_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE expires_at < $1")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete expired tokens", e)
            })?;

        Ok(result.rows_affected())
    }
}
