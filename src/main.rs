//! SessionHub Server: bearer-token session service
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use sessionhub_api::{AppState, build_router};
use sessionhub_auth::{DatabaseIdentityProvider, MemoryTokenStore, SessionService, TokenStore};
use sessionhub_core::config::{AppConfig, TokenStoreKind};
use sessionhub_core::error::AppError;
use sessionhub_core::traits::SystemClock;
use sessionhub_database::DatabasePool;
use sessionhub_database::repositories::{AuthTokenRepository, UserRepository};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("SESSIONHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting SessionHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let database = DatabasePool::connect(&config.database).await?;
    sessionhub_database::migration::run_migrations(database.pool()).await?;

    // ── Step 2: Token store ──────────────────────────────────────
    let store: Arc<dyn TokenStore> = match config.session.store {
        TokenStoreKind::Postgres => Arc::new(AuthTokenRepository::new(database.pool().clone())),
        TokenStoreKind::Memory => {
            tracing::warn!("Using in-memory token store; sessions are lost on restart");
            Arc::new(MemoryTokenStore::new())
        }
    };
    tracing::info!(store = %config.session.store, "Token store initialized");

    // ── Step 3: Session service ──────────────────────────────────
    let users = Arc::new(UserRepository::new(database.pool().clone()));
    let sessions = Arc::new(SessionService::new(
        store,
        Arc::new(DatabaseIdentityProvider::new(users)),
        Arc::new(SystemClock),
        config.session.clone(),
    ));
    tracing::info!(
        timeout_seconds = config.session.timeout_seconds,
        renew_interval_seconds = config.session.renew_interval_seconds,
        cache_capacity = config.session.cache_capacity,
        "Session service initialized"
    );

    // ── Step 4: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 5: Start token reclaimer ────────────────────────────
    let reclaimer_handle = if config.session.reclaimer_enabled {
        let reclaimer = sessions.reclaimer();
        let cancel = shutdown_rx.clone();
        Some(tokio::spawn(async move { reclaimer.run(cancel).await }))
    } else {
        tracing::info!("Token reclaimer disabled");
        None
    };

    // ── Step 6: Build and start HTTP server ──────────────────────
    let state = AppState::new(Arc::clone(&sessions), Some(database.clone()));
    let app = build_router(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("SessionHub server listening on {}", addr);

    // ── Step 7: Graceful shutdown ────────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 8: Wait for background tasks ────────────────────────
    if let Some(handle) = reclaimer_handle {
        let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
        match tokio::time::timeout(grace, handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "Token reclaimer task failed"),
            Err(_) => tracing::warn!("Token reclaimer did not stop within the grace period"),
        }
    }

    database.close().await;
    tracing::info!("SessionHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
