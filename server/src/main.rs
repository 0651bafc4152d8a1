//! Event Ticketing Server
//!
//! This binary:
//! - Connects to `PostgreSQL` and applies migrations
//! - Connects to Redis for login sessions
//! - Creates the bootstrap administrator, if configured
//! - Serves the HTTP API until Ctrl+C or SIGTERM
//!
//! # Usage
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/ticketing REDIS_URL=redis://localhost \
//!     cargo run --bin ticketing-server
//! ```

mod bootstrap;
mod config;

use anyhow::Context;
use config::Config;
use metrics_exporter_prometheus::PrometheusBuilder;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use ticketing_auth::stores::RedisSessionStore;
use ticketing_core::environment::{Clock, SystemClock};
use ticketing_postgres::PostgresStore;
use ticketing_web::{AppState, AuthSettings, build_router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ticketing=debug,sqlx=warn,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Event Ticketing Server...");

    let config = Config::from_env();
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        redis = %config.redis.url,
        "Configuration loaded"
    );

    PrometheusBuilder::new()
        .with_http_listener(config.metrics_addr()?)
        .install()
        .context("failed to install Prometheus exporter")?;
    ticketing_web::metrics::describe();
    tracing::info!(address = %config.metrics_addr()?, "Prometheus exporter listening");

    let pool = PgPoolOptions::new()
        .max_connections(config.postgres.max_connections)
        .min_connections(config.postgres.min_connections)
        .acquire_timeout(config.connect_timeout())
        .connect(&config.postgres.url)
        .await
        .context("failed to connect to PostgreSQL")?;
    let store = PostgresStore::from_pool(pool);
    store.migrate().await?;

    let sessions = RedisSessionStore::new(&config.redis.url).await?;
    tracing::info!("Connected to Redis session store");

    let clock = Arc::new(SystemClock);

    if let Some(admin) = &config.admin {
        bootstrap::ensure_admin(&store, admin, clock.now()).await?;
    }

    let state = AppState::new(store, Arc::new(sessions), clock).with_auth(AuthSettings {
        session_ttl: config.session_ttl(),
    });
    let app = build_router(state, &config.server.allowed_origins);

    let addr = config.server_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "HTTP server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM signal");
        }
    }
}
