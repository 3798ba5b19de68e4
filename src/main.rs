use std::sync::Arc;

use anyhow::Context;
use school_store::app_state::AppState;
use school_store::build_router;
use school_store::config::{Config, StoreBackend};
use school_store::db::pool::get_db_pool;
use school_store::db::store::{MemoryStore, PgStore, SharedStore};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Invalid configuration")?;

    std::fs::create_dir_all(&config.log_dir).context("Failed to create logs directory")?;
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "school-store.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "school_store=info,tower_http=info".into()),
        )
        .with(fmt::layer().with_target(true))
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .init();

    let (store, pool): (SharedStore, Option<PgPool>) = match config.store_backend {
        StoreBackend::Postgres => {
            let pool = get_db_pool(&config).await?;
            (Arc::new(PgStore::new(pool.clone())), Some(pool))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; data is lost on shutdown");
            (Arc::new(MemoryStore::new()), None)
        }
    };

    let addr = config.bind_addr;
    let app = build_router(AppState::new(store, config));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server encountered an error")?;

    if let Some(pool) = pool {
        info!("🛠️ Closing database pool...");
        pool.close().await;
    }
    info!("✅ Shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down...");
}
