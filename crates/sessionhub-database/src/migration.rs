//! Schema migrations for the `users` and `auth_tokens` tables.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use sessionhub_core::error::{AppError, ErrorKind};

/// Migrations embedded from the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Apply every pending migration.
///
/// Safe to call on each start; applied versions are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    let latest = MIGRATOR.iter().map(|m| m.version).max().unwrap_or_default();
    info!(
        known = MIGRATOR.iter().count(),
        latest, "Applying session schema migrations"
    );

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Session schema migration failed: {e}"),
            e,
        )
    })?;

    info!(version = latest, "Session schema up to date");
    Ok(())
}
