//! # sessionhub-api
//!
//! HTTP API layer for SessionHub built on Axum.
//!
//! Exposes the session lifecycle over REST (login, logout, current
//! identity), a bearer-token extractor, request logging, and the mapping
//! from `AppError` to HTTP responses.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
