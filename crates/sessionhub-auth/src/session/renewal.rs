//! Sliding-expiry renewal protocol.
//!
//! Renewal is rate-limited by `renew_interval` and coordinated through the
//! store's conditional update rather than a lock: an extension only applies
//! while the record is still alive and never shortens an existing expiry.
//! Within one instance a token has at most one renewal in flight.

use chrono::{DateTime, Utc};
use dashmap::DashSet;
use tracing::debug;

use sessionhub_core::error::AppError;
use sessionhub_core::result::AppResult;
use sessionhub_entity::token::{AuthToken, SessionDetails, model::fingerprint};

use super::service::SessionService;

/// Which branch a renewal check took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalOutcome {
    /// Last extension is younger than the renew interval.
    NotDue,
    /// Another request on this instance is already renewing the token.
    InFlight,
    /// The store already held a newer extension; it was copied into the cache.
    Adopted,
    /// This call extended the expiry.
    Renewed,
    /// The store no longer holds a live record; the cache entry was dropped.
    Invalidated,
}

/// Marks a token as being renewed until dropped.
struct RenewalGuard<'a> {
    renewing: &'a DashSet<String>,
    token: String,
}

impl<'a> RenewalGuard<'a> {
    fn acquire(renewing: &'a DashSet<String>, token: &str) -> Option<Self> {
        renewing.insert(token.to_string()).then(|| Self {
            renewing,
            token: token.to_string(),
        })
    }
}

impl Drop for RenewalGuard<'_> {
    fn drop(&mut self) {
        self.renewing.remove(&self.token);
    }
}

impl SessionService {
    /// Extends the expiry of a cached session if a renewal is due.
    ///
    /// 1. Do nothing while `now - last_updated_on < renew_interval`
    /// 2. Re-read the authoritative record from the store
    /// 3. Absent or expired: drop the cache entry
    /// 4. Newer extension in the store: adopt it without writing
    /// 5. Otherwise extend to `now + timeout` with a conditional update,
    ///    re-reading once if the update matched nothing
    ///
    /// The cache is only ever updated in place, so an entry removed by a
    /// concurrent revoke stays removed.
    pub async fn check_and_renew(
        &self,
        cached: &SessionDetails,
        now: DateTime<Utc>,
    ) -> AppResult<RenewalOutcome> {
        if now - cached.last_updated_on < self.config.renew_interval() {
            return Ok(RenewalOutcome::NotDue);
        }

        let Some(_guard) = RenewalGuard::acquire(&self.renewing, &cached.token) else {
            return Ok(RenewalOutcome::InFlight);
        };

        let token = cached.token.as_str();
        let current = self.store.fetch_by_token(token).await?;

        let record = match self.classify(cached, current, now).await {
            Ok(outcome) => return Ok(outcome),
            Err(record) => record,
        };

        let new_expires_at = now + self.config.timeout();
        if self
            .store
            .update_expires_at(token, now, new_expires_at, now)
            .await?
        {
            let renewed = AuthToken {
                expires_at: new_expires_at,
                last_updated_on: now,
                ..record
            };
            self.cache.refresh(&renewed).await;

            debug!(
                token = fingerprint(token),
                expires_at = %new_expires_at,
                "Session renewed"
            );
            return Ok(RenewalOutcome::Renewed);
        }

        debug!(token = fingerprint(token), "Conditional renewal matched nothing, re-reading");
        let current = self.store.fetch_by_token(token).await?;
        match self.classify(cached, current, now).await {
            Ok(outcome) => Ok(outcome),
            Err(_) => Err(AppError::renewal_conflict(format!(
                "Renewal of {} did not apply and no newer extension was found",
                fingerprint(token)
            ))),
        }
    }

    /// Settles a renewal from the authoritative record when no write is
    /// needed. Hands the record back when an extension should be attempted.
    async fn classify(
        &self,
        cached: &SessionDetails,
        current: Option<AuthToken>,
        now: DateTime<Utc>,
    ) -> Result<RenewalOutcome, AuthToken> {
        match current {
            Some(record) if !record.is_valid_at(now) => {
                self.invalidate(cached).await;
                Ok(RenewalOutcome::Invalidated)
            }
            None => {
                self.invalidate(cached).await;
                Ok(RenewalOutcome::Invalidated)
            }
            Some(record)
                if record.last_updated_on > cached.last_updated_on
                    || record.expires_at > cached.expires_at =>
            {
                self.cache.refresh(&record).await;
                debug!(
                    token = record.fingerprint(),
                    expires_at = %record.expires_at,
                    "Adopted newer extension from store"
                );
                Ok(RenewalOutcome::Adopted)
            }
            Some(record) => Err(record),
        }
    }

    async fn invalidate(&self, cached: &SessionDetails) {
        self.cache.remove(&cached.token).await;
        debug!(
            token = fingerprint(&cached.token),
            "Store has no live record, dropped cached session"
        );
    }
}
