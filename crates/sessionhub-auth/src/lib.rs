//! # sessionhub-auth
//!
//! The session token lifecycle for SessionHub.
//!
//! ## Modules
//!
//! - `session`: issuing, resolving, sliding renewal, revocation, and the
//!   background reclaimer, plus the durable store contract
//! - `identity`: credential verification collaborator
//! - `password`: Argon2id password hashing
//! - `token`: opaque bearer token generation

pub mod identity;
pub mod password;
pub mod session;
pub mod token;

pub use identity::{DatabaseIdentityProvider, FixedIdentityProvider, IdentityProvider};
pub use password::PasswordHasher;
pub use session::{
    MemoryTokenStore, RenewalOutcome, SessionService, TokenReclaimer, TokenStore,
};
pub use token::TokenGenerator;
