//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use sessionhub_auth::SessionService;
use sessionhub_database::DatabasePool;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Session lifecycle service
    pub sessions: Arc<SessionService>,
    /// PostgreSQL pool, absent when running on the in-memory store
    pub database: Option<DatabasePool>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Creates the state for a running server.
    pub fn new(sessions: Arc<SessionService>, database: Option<DatabasePool>) -> Self {
        Self {
            sessions,
            database,
            started_at: Instant::now(),
        }
    }
}
