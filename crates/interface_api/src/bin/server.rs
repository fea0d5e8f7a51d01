//! Delivery Ledger - API Server Binary
//!
//! Starts the HTTP API over the delivery challan ledger.
//!
//! # Usage
//!
//! ```bash
//! # Run against PostgreSQL
//! API_DATABASE_URL=postgres://... cargo run --bin ledger-api
//!
//! # Run without a database
//! API_STORAGE=memory cargo run --bin ledger-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_DB_MAX_CONNECTIONS` - Pool size, one connection per in-flight write (default: 10)
//! * `API_DB_MIN_CONNECTIONS` - Idle connections kept open (default: 2)
//! * `API_DB_ACQUIRE_TIMEOUT_SECS` - Wait for a pooled connection (default: 30)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_CATALOG_PATH` - Pricing catalog file (default: config/catalog.toml)
//! * `API_STORAGE` - `postgres` or `memory` (default: postgres)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_catalog::PricingCatalog;
use domain_delivery::{DeliveryEngine, DeliveryStore, InMemoryDeliveryStore};
use infra_db::{create_pool, run_migrations, PostgresDeliveryStore};
use interface_api::config::{ApiConfig, StorageBackend};
use interface_api::create_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid API_* configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        storage = ?config.storage,
        "Starting delivery ledger API server"
    );

    let catalog = PricingCatalog::from_file(&config.catalog_path)
        .with_context(|| format!("failed to load catalog from {}", config.catalog_path.display()))?;
    tracing::info!(items = catalog.items().len(), currency = ?catalog.currency(), "Catalog loaded");

    let store = build_store(&config).await?;
    let engine = DeliveryEngine::new(store, Arc::new(catalog));

    let app = create_router(engine, config.clone());
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .context("invalid listen address")?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Opens the configured store, migrating PostgreSQL first
async fn build_store(config: &ApiConfig) -> anyhow::Result<Arc<dyn DeliveryStore>> {
    match config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            Ok(Arc::new(InMemoryDeliveryStore::new()))
        }
        StorageBackend::Postgres => {
            let pool = create_pool(config.database()).await?;
            run_migrations(&pool).await?;
            Ok(Arc::new(PostgresDeliveryStore::new(pool)))
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for Ctrl+C or SIGTERM.
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
