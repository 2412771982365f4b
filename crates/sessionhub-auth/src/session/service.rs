//! Session lifecycle service: authenticate, resolve, revoke.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashSet;
use tracing::{debug, error, info, trace, warn};

use sessionhub_cache::{BoundedTokenCache, CacheStats};
use sessionhub_core::config::SessionConfig;
use sessionhub_core::error::{AppError, ErrorKind};
use sessionhub_core::result::AppResult;
use sessionhub_core::traits::Clock;
use sessionhub_entity::identity::Identity;
use sessionhub_entity::token::{AuthToken, CreateAuthToken, SessionDetails, model::fingerprint};

use crate::identity::IdentityProvider;
use crate::token::TokenGenerator;

use super::reclaimer::TokenReclaimer;
use super::store::TokenStore;

/// Attempts at persisting a freshly generated token before giving up.
const MAX_ISSUE_ATTEMPTS: u32 = 3;

/// Orchestrates token issuance, lookup, sliding renewal, and revocation.
///
/// The cache is consulted first; the durable store is authoritative and is
/// read on a miss, on a stale hit, and when a renewal comes due. Clones
/// share the cache and the in-flight renewal set.
#[derive(Clone)]
pub struct SessionService {
    /// Durable, shared token records.
    pub(super) store: Arc<dyn TokenStore>,
    /// Per-instance session cache.
    pub(super) cache: BoundedTokenCache,
    /// Credential verification.
    identities: Arc<dyn IdentityProvider>,
    /// Bearer string source.
    generator: TokenGenerator,
    /// Time source.
    pub(super) clock: Arc<dyn Clock>,
    /// Session configuration.
    pub(super) config: SessionConfig,
    /// Tokens with a renewal currently in flight on this instance.
    pub(super) renewing: Arc<DashSet<String>>,
    /// Bumped by every revoke; a cache fill that overlaps one is undone.
    revocations: Arc<AtomicU64>,
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish()
    }
}

impl SessionService {
    /// Creates a session service; the cache is sized from `config`.
    pub fn new(
        store: Arc<dyn TokenStore>,
        identities: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
    ) -> Self {
        Self {
            store,
            cache: BoundedTokenCache::new(config.cache_capacity),
            identities,
            generator: TokenGenerator::new(config.token_bytes),
            clock,
            config,
            renewing: Arc::new(DashSet::new()),
            revocations: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Verifies credentials and issues a new token.
    ///
    /// Returns the identity annotated with the new token.
    pub async fn authenticate(
        &self,
        identifier: &str,
        secret: &str,
        role: &str,
    ) -> AppResult<Identity> {
        self.login(identifier, secret, role)
            .await
            .map(|details| details.identity)
    }

    /// Performs the complete login flow:
    ///
    /// 1. Verify credentials with the identity provider
    /// 2. Generate a token and persist it with `expires_at = now + timeout`
    /// 3. Populate the cache
    ///
    /// A credential failure has no side effects.
    pub async fn login(
        &self,
        identifier: &str,
        secret: &str,
        role: &str,
    ) -> AppResult<SessionDetails> {
        // Step 1: Verify credentials
        let identity = match self.identities.validate(identifier, secret, role).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(username = identifier, role, error = %e, "Authentication failed");
                return Err(e);
            }
        };

        // Step 2: Persist a fresh token
        let now = self.clock.now();
        let record = self.issue(&identity, now).await?;

        // Step 3: Seed the cache
        let details = SessionDetails::from_record(&record, identity);
        self.cache.put(record.token.clone(), details.clone()).await;

        info!(
            user_id = %record.user_id,
            role = %record.role,
            token = record.fingerprint(),
            expires_at = %record.expires_at,
            "Session opened"
        );

        Ok(details)
    }

    /// Resolves a bearer token to its identity.
    ///
    /// A live cache hit is returned immediately after the renewal check,
    /// whose failures are logged and never surfaced. Anything else is
    /// answered by the store: unknown tokens fail with `InvalidToken`,
    /// expired ones with `TokenExpired`.
    pub async fn resolve(&self, token: &str) -> AppResult<Identity> {
        let now = self.clock.now();

        if let Some(cached) = self.cache.get(token).await {
            if cached.is_valid_at(now) {
                match self.check_and_renew(&cached, now).await {
                    Ok(outcome) => trace!(token = fingerprint(token), ?outcome, "Renewal check"),
                    Err(e) => {
                        warn!(token = fingerprint(token), error = %e, "Renewal skipped")
                    }
                }
                return Ok(cached.identity);
            }
            debug!(token = fingerprint(token), "Cached session past expiry, consulting store");
        }

        match self.load_from_store(token, now).await {
            Ok(details) => Ok(details.identity),
            Err(e) => {
                if e.is_token_failure() {
                    self.cache.remove(token).await;
                }
                Err(e)
            }
        }
    }

    /// Revokes a token. Revoking an unknown token is not an error.
    ///
    /// The cache entry is dropped even if the store delete fails.
    pub async fn revoke(&self, token: &str) -> AppResult<()> {
        let deleted = self.store.delete_by_token(token).await;
        self.revocations.fetch_add(1, Ordering::SeqCst);
        self.cache.remove(token).await;
        let existed = deleted?;

        if existed {
            info!(token = fingerprint(token), "Session revoked");
        } else {
            debug!(token = fingerprint(token), "Revoke for unknown token");
        }

        Ok(())
    }

    /// Builds the periodic reclaimer bound to this service's store and clock.
    pub fn reclaimer(&self) -> TokenReclaimer {
        TokenReclaimer::new(
            Arc::clone(&self.store),
            Arc::clone(&self.clock),
            self.config.reclaim_interval(),
        )
    }

    /// Session configuration in effect.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Cache hit/miss/eviction counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Rebuilds session details from the store and caches them.
    ///
    /// If a revoke ran on this instance while the record was being loaded,
    /// the freshly cached entry is dropped again so the revoke is not undone.
    async fn load_from_store(&self, token: &str, now: DateTime<Utc>) -> AppResult<SessionDetails> {
        let epoch = self.revocations.load(Ordering::SeqCst);
        let record = self
            .store
            .fetch_by_token(token)
            .await?
            .ok_or_else(|| AppError::invalid_token("Unknown token"))?;

        if !record.is_valid_at(now) {
            return Err(AppError::token_expired("Token has expired"));
        }

        let identity = self
            .identities
            .load(record.user_id, &record.role)
            .await?
            .ok_or_else(|| AppError::invalid_token("Token owner no longer exists"))?;
        let identity = Identity {
            custom_space: record.custom_space.clone(),
            ..identity
        };

        let details = SessionDetails::from_record(&record, identity);
        self.cache.put(record.token.clone(), details.clone()).await;
        if self.revocations.load(Ordering::SeqCst) != epoch {
            self.cache.remove(&record.token).await;
            debug!(token = record.fingerprint(), "Revoke overlapped cache fill, entry dropped");
        }

        debug!(
            token = record.fingerprint(),
            user_id = %record.user_id,
            "Session rebuilt from store"
        );

        Ok(details)
    }

    /// Persists a new record under a freshly generated token, retrying on a
    /// token collision.
    async fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> AppResult<AuthToken> {
        let mut attempt = 1;

        loop {
            let record = CreateAuthToken {
                token: self.generator.generate(),
                user_id: identity.user_id,
                role: identity.role.clone(),
                custom_space: identity.custom_space.clone(),
                expires_at: now + self.config.timeout(),
                issued_at: now,
            };

            match self.store.save(record).await {
                Ok(saved) => return Ok(saved),
                Err(e) if e.kind == ErrorKind::Conflict && attempt < MAX_ISSUE_ATTEMPTS => {
                    warn!(attempt, "Generated token already issued, retrying");
                    attempt += 1;
                }
                Err(e) => {
                    error!(user_id = %identity.user_id, error = %e, "Failed to persist token");
                    return Err(e);
                }
            }
        }
    }
}
