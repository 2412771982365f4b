//! # sessionhub-entity
//!
//! Domain entity models for SessionHub. Durable rows derive
//! `sqlx::FromRow`; derived values such as [`token::SessionDetails`] are
//! plain structs that are never persisted.

pub mod identity;
pub mod token;
pub mod user;

pub use identity::Identity;
pub use token::{AuthToken, CreateAuthToken, SessionDetails};
pub use user::User;
