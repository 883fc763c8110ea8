//! motormarket server entry point.
//!
//! Boots the aggregation-and-cache service: loads configuration, builds the
//! signed upstream client, the in-memory cache, and the market analyzer,
//! then serves the HTTP boundary until ctrl-c.

use std::sync::Arc;

use anyhow::Result;
use motormarket_client::{BearerSigner, HmacSigner, Marketplace, MarketplaceClient, MarketplaceConfig, RequestSigner};
use motormarket_core::cache::spawn_sweeper;
use motormarket_core::{AppConfig, Credentials, MemoryCache};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod api;
mod error;
mod market;
mod state;

use market::{MarketAnalyzer, SampleSizes};
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;

    let signer: Arc<dyn RequestSigner> = match config.require_credentials()? {
        Credentials::Consumer { key, secret } => Arc::new(HmacSigner::new(key, secret)),
        Credentials::Token(token) => Arc::new(BearerSigner::new(token)),
    };

    let upstream: Arc<dyn Marketplace> = Arc::new(MarketplaceClient::new(
        MarketplaceConfig {
            base_url: config.upstream_base_url.clone(),
            timeout: config.timeout(),
            ..Default::default()
        },
        signer,
    )?);

    let cache = Arc::new(MemoryCache::new(config.cache_ttl()));
    spawn_sweeper(cache.clone(), config.sweep_interval());

    let analyzer = MarketAnalyzer::new(
        upstream.clone(),
        SampleSizes { model_rows: config.model_sample_rows, insights_rows: config.insights_sample_rows },
    );

    let state = Arc::new(AppState { upstream, cache, analyzer, ttls: config.ttls.clone() });
    let app = api::router(state);

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(host = %config.host, port = config.port, "motormarket listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("motormarket stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
