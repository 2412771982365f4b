//! Periodic removal of expired token records.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use sessionhub_core::result::AppResult;
use sessionhub_core::traits::Clock;

use super::store::TokenStore;

/// Deletes expired records from the durable store on a fixed interval.
///
/// Never touches any cache: a cached session whose record was reclaimed
/// is corrected on its next lookup.
#[derive(Clone)]
pub struct TokenReclaimer {
    store: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl std::fmt::Debug for TokenReclaimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenReclaimer")
            .field("interval", &self.interval)
            .finish()
    }
}

impl TokenReclaimer {
    /// Creates a reclaimer running every `interval`.
    pub fn new(store: Arc<dyn TokenStore>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            store,
            clock,
            interval,
        }
    }

    /// Runs one reclamation pass.
    ///
    /// Returns the number of records removed.
    pub async fn run_once(&self) -> AppResult<u64> {
        let before = self.clock.now();
        let count = self.store.delete_expired_tokens(before).await?;

        if count > 0 {
            info!(count, "Reclaimed expired tokens");
        } else {
            debug!("No expired tokens to reclaim");
        }

        Ok(count)
    }

    /// Runs passes until `cancel` turns `true` or its sender is dropped.
    ///
    /// The first pass runs immediately. A failed pass is logged and retried
    /// on the next tick.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(
            interval_seconds = self.interval.as_secs(),
            "Token reclaimer started"
        );

        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.run_once().await {
                        error!(error = %e, "Token reclamation failed");
                    }
                }
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("Token reclaimer shutting down");
                        break;
                    }
                }
            }
        }
    }
}
