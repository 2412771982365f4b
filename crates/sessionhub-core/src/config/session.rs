//! Session token lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Longest timeout or renew interval honored, in seconds (100 years).
/// Larger configured values are clamped to it.
pub const MAX_DURATION_SECONDS: u64 = 100 * 365 * 24 * 3600;

/// Which durable store backs issued tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStoreKind {
    /// PostgreSQL `auth_tokens` table.
    #[default]
    Postgres,
    /// Process-local map. Single node only, lost on restart.
    Memory,
}

impl std::fmt::Display for TokenStoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenStoreKind::Postgres => write!(f, "postgres"),
            TokenStoreKind::Memory => write!(f, "memory"),
        }
    }
}

/// Session token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sliding session timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Minimum seconds between two expiry extensions of the same token.
    #[serde(default = "default_renew_interval")]
    pub renew_interval_seconds: u64,
    /// Seconds between reclaimer runs.
    #[serde(default = "default_reclaim_interval")]
    pub reclaim_interval_seconds: u64,
    /// Whether the background reclaimer is started.
    #[serde(default = "default_true")]
    pub reclaimer_enabled: bool,
    /// Maximum number of sessions held in the in-memory cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Number of random bytes in an issued token.
    #[serde(default = "default_token_bytes")]
    pub token_bytes: usize,
    /// Durable token store backend.
    #[serde(default)]
    pub store: TokenStoreKind,
}

impl SessionConfig {
    /// Session timeout as a chrono duration.
    pub fn timeout(&self) -> chrono::Duration {
        clamped_seconds(self.timeout_seconds)
    }

    /// Renewal interval as a chrono duration.
    pub fn renew_interval(&self) -> chrono::Duration {
        clamped_seconds(self.renew_interval_seconds)
    }

    /// Reclaimer interval as a std duration, for tokio timers.
    pub fn reclaim_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.reclaim_interval_seconds.max(1))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            renew_interval_seconds: default_renew_interval(),
            reclaim_interval_seconds: default_reclaim_interval(),
            reclaimer_enabled: true,
            cache_capacity: default_cache_capacity(),
            token_bytes: default_token_bytes(),
            store: TokenStoreKind::default(),
        }
    }
}

fn clamped_seconds(seconds: u64) -> chrono::Duration {
    let seconds = i64::try_from(seconds.min(MAX_DURATION_SECONDS)).unwrap_or(i64::MAX);
    chrono::TimeDelta::try_seconds(seconds).unwrap_or(chrono::TimeDelta::MAX)
}

fn default_timeout() -> u64 {
    1800
}

fn default_renew_interval() -> u64 {
    300
}

fn default_reclaim_interval() -> u64 {
    3600
}

fn default_true() -> bool {
    true
}

fn default_cache_capacity() -> usize {
    10_000
}

fn default_token_bytes() -> usize {
    32
}
