//! `AuthUser` extractor: resolves the bearer token from the Authorization header.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use sessionhub_core::error::AppError;
use sessionhub_entity::identity::Identity;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Identity the token resolved to.
    pub identity: Identity,
    /// The presented bearer token.
    pub token: String,
}

impl std::ops::Deref for AuthUser {
    type Target = Identity;
    fn deref(&self) -> &Self::Target {
        &self.identity
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::invalid_token("Missing Authorization header"))?;

        let token = bearer_token(header)
            .ok_or_else(|| AppError::invalid_token("Invalid Authorization header format"))?;

        let identity = state.sessions.resolve(token).await?;

        Ok(AuthUser {
            identity,
            token: token.to_string(),
        })
    }
}
