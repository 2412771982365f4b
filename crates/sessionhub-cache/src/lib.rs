//! # sessionhub-cache
//!
//! In-process cache of live sessions, keyed by bearer token.
//!
//! The cache is bounded and evicts the least-recently-used entry on
//! overflow. It carries no time-based expiry of its own: staleness is
//! decided by the expiry fields inside each cached value, and any evicted
//! entry is rebuilt from the durable store on the next miss.

pub mod memory;

pub use memory::{BoundedTokenCache, CacheStats};
