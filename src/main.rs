//! SessionWard Server: access/refresh token rotation service.
//!
//! Main entry point that wires all crates together and starts the server.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use sessionward_api::{AppState, build_app};
use sessionward_auth::SessionManager;
use sessionward_core::config::{AppConfig, LogFormat};
use sessionward_core::error::AppError;
use sessionward_core::traits::SecurityNotifier;
use sessionward_database::migration::run_migrations;
use sessionward_database::{DatabasePool, SessionRepository, UserRepository};
use sessionward_notify::{LogNotifier, SmtpNotifier};

#[tokio::main]
async fn main() {
    // A missing .env is fine; the environment or config files may cover everything.
    let _ = dotenvy::dotenv();

    let env = std::env::var("SESSIONWARD_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config, &env).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig, env: &str) -> Result<(), AppError> {
    tracing::info!(env = %env, "Starting SessionWard v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db_pool = DatabasePool::connect(&config.database).await?;
    run_migrations(db_pool.pool()).await?;

    // ── Step 2: Stores and notifier ──────────────────────────────
    let users = Arc::new(UserRepository::new(db_pool.pool().clone()));
    let sessions = Arc::new(SessionRepository::new(db_pool.pool().clone()));

    let notifier: Arc<dyn SecurityNotifier> = if config.smtp.enabled {
        tracing::info!(host = %config.smtp.host, port = config.smtp.port, "IP-change alerts via SMTP");
        Arc::new(SmtpNotifier::new(&config.smtp)?)
    } else {
        tracing::warn!("SMTP disabled; IP-change alerts will only be logged");
        Arc::new(LogNotifier::new())
    };

    // ── Step 3: Session engine ───────────────────────────────────
    let session_manager = SessionManager::new(config.auth.clone(), users, sessions, notifier)?;
    tracing::info!(
        access_ttl_minutes = config.auth.access_ttl_minutes,
        refresh_ttl_hours = config.auth.refresh_ttl_hours,
        ip_change_alert = %config.auth.ip_change_alert,
        "Session engine ready"
    );

    // ── Step 4: HTTP server ──────────────────────────────────────
    if config.server.trusted_proxies.is_empty() {
        tracing::info!("No trusted proxies; client IP is the socket peer");
    }
    let state = AppState::new(Arc::new(session_manager))
        .with_db_pool(db_pool.clone())
        .with_trusted_proxies(config.server.trusted_proxies.iter().copied());
    let app = build_app(state, &config.server.cors);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(addr = %addr, "SessionWard listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    db_pool.close().await;
    tracing::info!("SessionWard shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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

    tracing::info!("Shutdown signal received");
}
