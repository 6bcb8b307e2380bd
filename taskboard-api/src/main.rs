//! # Taskboard API Server
//!
//! Team task tracking over HTTP: projects, tasks assigned to users, comments
//! and a dashboard summary, behind bearer-token authentication.
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=$(openssl rand -hex 32) cargo run -p taskboard-api
//! ```
//!
//! Without `DATABASE_URL` the server runs on the in-memory store.

use std::sync::Arc;

use anyhow::Context;
use taskboard_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat},
};
use taskboard_shared::{
    db::{migrations, pool},
    services::seed,
    store::{MemoryStore, PgStore, Store},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    init_tracing(config.log.format);

    tracing::info!(
        "Taskboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let mut pg_pool = None;
    let store: Arc<dyn Store> = if config.database.is_memory() {
        tracing::warn!("Using in-memory store; data is lost on shutdown");
        Arc::new(MemoryStore::new())
    } else {
        migrations::ensure_database_exists(&config.database.url)
            .await
            .context("failed to ensure database exists")?;
        let pg = pool::create_pool(config.database.pool_config())
            .await
            .context("failed to connect to database")?;
        migrations::run_migrations(&pg)
            .await
            .context("failed to run migrations")?;
        let stats = pool::pool_stats(&pg);
        tracing::info!(
            active = stats.active_connections,
            idle = stats.idle_connections,
            "Database pool ready"
        );
        pg_pool = Some(pg.clone());
        Arc::new(PgStore::new(pg))
    };

    if config.api.seed_sample_data {
        let outcome = seed::seed_sample_data(store.as_ref(), &config.hashing)
            .await
            .context("failed to seed sample data")?;
        tracing::info!(?outcome, "Sample data check complete");
    }

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pg) = pg_pool {
        let stats = pool::pool_stats(&pg);
        tracing::info!(active = stats.active_connections, "Draining database pool");
        pool::close_pool(&pg).await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taskboard_api=debug,taskboard_shared=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
