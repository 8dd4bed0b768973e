use std::sync::Arc;
use std::net::SocketAddr;
use anyhow::Context;
use chrono::FixedOffset;
use seatkeep_api::{app, worker, AppState, AuthConfig};
use seatkeep_core::{Clock, SystemClock};
use seatkeep_store::{app_config::Config, DbClient, PgStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seatkeep_api=debug,seatkeep_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Seatkeep API on port {}", config.server.port);

    // Database
    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to run migrations")?;

    let store = Arc::new(PgStore::new(db.pool.clone()));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let policy = config
        .reservation
        .policy()
        .context("Invalid reservation settings")?;
    let utc_offset = FixedOffset::east_opt(config.reservation.utc_offset_minutes * 60)
        .context("reservation.utc_offset_minutes out of range")?;

    let app_state = AppState::new(
        store.clone(),
        clock.clone(),
        policy.clone(),
        AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        utc_offset,
    );

    // Background sweeper
    let sweeper = worker::start_expiry_sweeper(store, clock, policy);

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    sweeper.stop().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
