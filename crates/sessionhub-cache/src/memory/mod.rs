//! In-memory cache implementations.

pub mod token_cache;

pub use token_cache::{BoundedTokenCache, CacheStats};
