//! Repository implementations for SessionHub entities.

pub mod auth_token;
pub mod user;

pub use auth_token::AuthTokenRepository;
pub use user::UserRepository;
