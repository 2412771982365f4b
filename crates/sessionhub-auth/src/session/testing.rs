//! Test doubles shared by the session tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use uuid::Uuid;

use sessionhub_core::config::SessionConfig;
use sessionhub_core::error::AppError;
use sessionhub_core::result::AppResult;
use sessionhub_core::traits::ManualClock;
use sessionhub_entity::identity::Identity;
use sessionhub_entity::token::{AuthToken, CreateAuthToken};

use super::memory::MemoryTokenStore;
use super::service::SessionService;
use super::store::TokenStore;
use crate::identity::FixedIdentityProvider;

#[derive(Debug, Default)]
struct Counters {
    reads: AtomicUsize,
    save_attempts: AtomicUsize,
    update_calls: AtomicUsize,
    renewals: AtomicUsize,
    deletes: AtomicUsize,
    failing_saves: AtomicUsize,
    delete_before_update: AtomicBool,
    reject_update: AtomicBool,
    fail_reads: AtomicBool,
    park_read: AtomicBool,
    parked: Notify,
    resume: Notify,
}

/// Wraps [`MemoryTokenStore`], counting calls and injecting faults.
#[derive(Debug, Clone)]
pub(crate) struct CountingStore {
    inner: MemoryTokenStore,
    counters: Arc<Counters>,
}

impl CountingStore {
    pub(crate) fn new(inner: MemoryTokenStore) -> Self {
        Self {
            inner,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Report the next `n` saves as token collisions.
    pub(crate) fn failing_saves(self, n: usize) -> Self {
        self.counters.failing_saves.store(n, Ordering::SeqCst);
        self
    }

    /// Delete the record just before the next conditional update applies.
    pub(crate) fn delete_before_next_update(&self) {
        self.counters.delete_before_update.store(true, Ordering::SeqCst);
    }

    /// Make the next conditional update match nothing.
    pub(crate) fn reject_next_update(&self) {
        self.counters.reject_update.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_reads(&self, fail: bool) {
        self.counters.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Hold the next read, after it has fetched, until [`Self::resume_read`].
    pub(crate) fn park_next_read(&self) {
        self.counters.park_read.store(true, Ordering::SeqCst);
    }

    /// Wait until a read is parked.
    pub(crate) async fn wait_parked(&self) {
        self.counters.parked.notified().await;
    }

    pub(crate) fn resume_read(&self) {
        self.counters.resume.notify_one();
    }

    /// Whether the record exists, bypassing counters and injected faults.
    pub(crate) async fn holds(&self, token: &str) -> bool {
        matches!(self.inner.fetch_by_token(token).await, Ok(Some(_)))
    }

    pub(crate) fn reads(&self) -> usize {
        self.counters.reads.load(Ordering::SeqCst)
    }

    pub(crate) fn save_attempts(&self) -> usize {
        self.counters.save_attempts.load(Ordering::SeqCst)
    }

    /// Conditional updates that changed a record.
    pub(crate) fn renewals(&self) -> usize {
        self.counters.renewals.load(Ordering::SeqCst)
    }

    /// Every mutating call, successful or not.
    pub(crate) fn writes(&self) -> usize {
        self.counters.save_attempts.load(Ordering::SeqCst)
            + self.counters.update_calls.load(Ordering::SeqCst)
            + self.counters.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenStore for CountingStore {
    async fn fetch_by_token(&self, token: &str) -> AppResult<Option<AuthToken>> {
        self.counters.reads.fetch_add(1, Ordering::SeqCst);
        if self.counters.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::database("store unavailable"));
        }
        let record = self.inner.fetch_by_token(token).await?;
        if self.counters.park_read.swap(false, Ordering::SeqCst) {
            self.counters.parked.notify_one();
            self.counters.resume.notified().await;
        }
        Ok(record)
    }

    async fn save(&self, record: CreateAuthToken) -> AppResult<AuthToken> {
        self.counters.save_attempts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.counters.failing_saves.load(Ordering::SeqCst);
        if remaining > 0 {
            self.counters.failing_saves.store(remaining - 1, Ordering::SeqCst);
            return Err(AppError::conflict("Token already issued"));
        }
        self.inner.save(record).await
    }

    async fn update_expires_at(
        &self,
        token: &str,
        condition_after: DateTime<Utc>,
        new_expires_at: DateTime<Utc>,
        new_last_updated_on: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.counters.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.counters.delete_before_update.swap(false, Ordering::SeqCst) {
            self.inner.delete_by_token(token).await?;
        }
        if self.counters.reject_update.swap(false, Ordering::SeqCst) {
            return Ok(false);
        }

        let applied = self
            .inner
            .update_expires_at(token, condition_after, new_expires_at, new_last_updated_on)
            .await?;
        if applied {
            self.counters.renewals.fetch_add(1, Ordering::SeqCst);
        }
        Ok(applied)
    }

    async fn delete_by_token(&self, token: &str) -> AppResult<bool> {
        self.counters.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_by_token(token).await
    }

    async fn delete_expired_tokens(&self, before: DateTime<Utc>) -> AppResult<u64> {
        if self.counters.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::database("store unavailable"));
        }
        self.inner.delete_expired_tokens(before).await
    }
}

pub(crate) fn alice() -> Identity {
    Identity {
        user_id: Uuid::from_u128(0xa11ce),
        username: "alice".to_string(),
        display_name: Some("Alice".to_string()),
        role: "user".to_string(),
        custom_space: Some("space-a".to_string()),
        token: None,
    }
}

/// A service over a counting in-memory store, a manual clock, and one
/// account (`alice` / `s3cret`, role `user`).
pub(crate) fn service_with(config: SessionConfig) -> (SessionService, CountingStore, ManualClock) {
    let store = CountingStore::new(MemoryTokenStore::new());
    let clock = ManualClock::default();
    let service = SessionService::new(
        Arc::new(store.clone()),
        Arc::new(FixedIdentityProvider::new().with_account(alice(), "s3cret")),
        Arc::new(clock.clone()),
        config,
    );
    (service, store, clock)
}
