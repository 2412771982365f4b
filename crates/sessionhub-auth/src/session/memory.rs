//! In-memory token store for single-node deployments and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use sessionhub_core::error::AppError;
use sessionhub_core::result::AppResult;
use sessionhub_entity::token::{AuthToken, CreateAuthToken};

use super::store::TokenStore;

#[derive(Debug, Default)]
struct InnerState {
    records: HashMap<String, AuthToken>,
}

/// Process-local [`TokenStore`].
///
/// Honors the same conditional-update rules as the database store and,
/// like it, only rejects a token that is currently live. Deleted and
/// reclaimed records leave nothing behind. Records do not survive a
/// restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records.
    pub async fn len(&self) -> usize {
        self.state.lock().await.records.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.records.is_empty()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn fetch_by_token(&self, token: &str) -> AppResult<Option<AuthToken>> {
        Ok(self.state.lock().await.records.get(token).cloned())
    }

    async fn save(&self, record: CreateAuthToken) -> AppResult<AuthToken> {
        let mut state = self.state.lock().await;

        if state.records.contains_key(&record.token) {
            return Err(AppError::conflict("Token already issued"));
        }

        let saved = AuthToken {
            id: Uuid::new_v4(),
            token: record.token,
            user_id: record.user_id,
            role: record.role,
            custom_space: record.custom_space,
            expires_at: record.expires_at,
            created_on: record.issued_at,
            last_updated_on: record.issued_at,
        };
        state.records.insert(saved.token.clone(), saved.clone());

        Ok(saved)
    }

    async fn update_expires_at(
        &self,
        token: &str,
        condition_after: DateTime<Utc>,
        new_expires_at: DateTime<Utc>,
        new_last_updated_on: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;

        match state.records.get_mut(token) {
            Some(record)
                if record.expires_at > condition_after && record.expires_at <= new_expires_at =>
            {
                record.expires_at = new_expires_at;
                record.last_updated_on = new_last_updated_on;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_by_token(&self, token: &str) -> AppResult<bool> {
        Ok(self.state.lock().await.records.remove(token).is_some())
    }

    async fn delete_expired_tokens(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before_count = state.records.len();
        state.records.retain(|_, record| record.expires_at >= before);
        if state.records.len() < state.records.capacity() / 4 {
            state.records.shrink_to_fit();
        }
        Ok((before_count - state.records.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use sessionhub_core::error::ErrorKind;

    use super::*;

    fn create(token: &str, issued_at: DateTime<Utc>, ttl: Duration) -> CreateAuthToken {
        CreateAuthToken {
            token: token.to_string(),
            user_id: Uuid::new_v4(),
            role: "user".to_string(),
            custom_space: None,
            expires_at: issued_at + ttl,
            issued_at,
        }
    }

    #[tokio::test]
    async fn test_save_and_fetch() {
        let store = MemoryTokenStore::new();
        let now = Utc::now();

        let saved = store.save(create("tok-a", now, Duration::minutes(30))).await.unwrap();
        assert_eq!(saved.created_on, now);
        assert_eq!(saved.last_updated_on, now);

        let fetched = store.fetch_by_token("tok-a").await.unwrap().unwrap();
        assert_eq!(fetched, saved);
        assert!(store.fetch_by_token("tok-b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_live_token_conflicts() {
        let store = MemoryTokenStore::new();
        let now = Utc::now();

        store.save(create("tok-a", now, Duration::minutes(30))).await.unwrap();
        let dup = store.save(create("tok-a", now, Duration::minutes(30))).await.unwrap_err();
        assert_eq!(dup.kind, ErrorKind::Conflict);

        assert!(store.delete_by_token("tok-a").await.unwrap());
        assert!(!store.delete_by_token("tok-a").await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_conditional_update_guards() {
        let store = MemoryTokenStore::new();
        let t0 = Utc::now();
        store.save(create("tok-a", t0, Duration::minutes(30))).await.unwrap();

        // Would shorten the expiry.
        let shorter = t0 + Duration::minutes(10);
        assert!(!store.update_expires_at("tok-a", t0, shorter, t0).await.unwrap());

        // Record already expired relative to the condition.
        let late = t0 + Duration::minutes(31);
        assert!(
            !store
                .update_expires_at("tok-a", late, late + Duration::minutes(30), late)
                .await
                .unwrap()
        );

        // Unknown token.
        assert!(
            !store
                .update_expires_at("tok-x", t0, t0 + Duration::hours(1), t0)
                .await
                .unwrap()
        );

        let now = t0 + Duration::minutes(5);
        let extended = now + Duration::minutes(30);
        assert!(store.update_expires_at("tok-a", now, extended, now).await.unwrap());

        let record = store.fetch_by_token("tok-a").await.unwrap().unwrap();
        assert_eq!(record.expires_at, extended);
        assert_eq!(record.last_updated_on, now);
    }

    #[tokio::test]
    async fn test_update_never_resurrects_deleted_record() {
        let store = MemoryTokenStore::new();
        let t0 = Utc::now();
        store.save(create("tok-a", t0, Duration::minutes(30))).await.unwrap();
        store.delete_by_token("tok-a").await.unwrap();

        assert!(
            !store
                .update_expires_at("tok-a", t0, t0 + Duration::hours(1), t0)
                .await
                .unwrap()
        );
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_expired_tokens() {
        let store = MemoryTokenStore::new();
        let t0 = Utc::now();
        store.save(create("short-1", t0, Duration::minutes(1))).await.unwrap();
        store.save(create("short-2", t0, Duration::minutes(2))).await.unwrap();
        store.save(create("long", t0, Duration::hours(1))).await.unwrap();

        let removed = store
            .delete_expired_tokens(t0 + Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.len().await, 1);
        assert!(store.fetch_by_token("long").await.unwrap().is_some());

        assert_eq!(
            store.delete_expired_tokens(t0 + Duration::minutes(5)).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_reclaim_frees_all_per_token_state() {
        let store = MemoryTokenStore::new();
        let t0 = Utc::now();
        for i in 0..1000 {
            store
                .save(create(&format!("tok-{i}"), t0, Duration::seconds(1)))
                .await
                .unwrap();
        }

        let removed = store
            .delete_expired_tokens(t0 + Duration::seconds(10))
            .await
            .unwrap();
        assert_eq!(removed, 1000);

        let state = store.state.lock().await;
        assert!(state.records.is_empty());
        assert!(state.records.capacity() < 1000);
    }
}
