//! Fare engine API server binary
//!
//! # Usage
//!
//! ```bash
//! # Seeded in-memory catalogue
//! cargo run --bin pricing-api
//!
//! # PostgreSQL catalogue, migrated on startup
//! API_PRICING_SOURCE=postgres DATABASE_URL=postgres://... cargo run --bin pricing-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_LOG_LEVEL` - Log filter (default: info; `RUST_LOG` wins when set)
//! * `API_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! * `API_PRICING_SOURCE` - `memory` or `postgres` (default: memory)
//! * `API_DATABASE_URL` / `DATABASE_URL` - PostgreSQL connection string
//! * `API_LOOKUP_TIMEOUT_MS` - Per-lookup timeout (default: 2000)
//! * `API_QUOTE_TIMEOUT_MS` - Per-quote deadline (default: 5000)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use domain_pricing::{PricingProviderPort, QuoteService};
use infra_db::{create_pool, DatabaseConfig, InMemoryPricingCatalog, PostgresPricingAdapter};
use interface_api::config::{ApiConfig, LogFormat, PricingSource};
use interface_api::create_router;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid API configuration")?;

    init_tracing(&config.log_level, config.log_format);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        source = ?config.pricing_source,
        "Starting fare engine API server"
    );

    let provider = build_provider(&config).await?;
    let quotes = QuoteService::with_config(provider, config.quote_config());

    let health = quotes.health_check().await;
    tracing::info!(
        provider = %health.adapter_id,
        status = ?health.status,
        latency_ms = health.latency_ms,
        "Pricing provider checked"
    );

    let app = create_router(quotes, config.clone());

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
    }
}

/// Builds the configured pricing provider.
///
/// The PostgreSQL backend applies the embedded migrations before serving.
async fn build_provider(config: &ApiConfig) -> anyhow::Result<Arc<dyn PricingProviderPort>> {
    match config.pricing_source {
        PricingSource::Memory => {
            tracing::info!("Using the in-memory reference catalogue");
            Ok(Arc::new(InMemoryPricingCatalog::with_default_catalog()))
        }
        PricingSource::Postgres => {
            let pool = create_pool(DatabaseConfig::new(&config.database_url).with_migrations())
                .await
                .context("failed to prepare the pricing database")?;
            Ok(Arc::new(PostgresPricingAdapter::new(pool)))
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
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
