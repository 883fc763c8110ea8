//! HTTP boundary for the presentation layer.
//!
//! A thin shell over the cache and the aggregator: every handler resolves a
//! cache key, reads through with its tier's TTL, and wraps the result in a
//! response envelope. Invalid inputs become 400 envelopes, never panics or
//! raw rejections.

pub mod envelope;

pub use envelope::{ApiResponse, EnvelopeResult, ok};

use std::sync::Arc;

use axum::Router;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use motormarket_client::{Listing, SearchPage, SearchQuery};
use motormarket_core::fingerprint;
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::error::ApiError;
use crate::market::{BrandStat, MarketInsights, MarketOverview, ModelStat, OVERVIEW_REGIONS, RegionStat};
use crate::state::AppState;

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/listings/search", get(search))
        .route("/api/listings/recent", get(recent))
        .route("/api/listings/:id", get(listing_details))
        .route("/api/categories", get(categories))
        .route("/api/market/overview", get(market_overview))
        .route("/api/market/brands", get(brand_stats))
        .route("/api/market/models/:make", get(model_stats))
        .route("/api/market/regions", get(region_stats))
        .route("/api/market/insights", get(market_insights))
        .route("/api/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn search(
    State(state): State<Arc<AppState>>, query: Result<Query<SearchQuery>, QueryRejection>,
) -> EnvelopeResult<SearchPage> {
    let Query(query) = query.map_err(|e| ApiError::Validation(e.body_text()))?;
    query.validate().map_err(ApiError::Upstream)?;

    let key = fingerprint("search", &query)?;
    let upstream = state.upstream.clone();
    let page = state
        .cache
        .get_or_compute(&key, Some(state.ttls.search()), || async move {
            upstream.search(&query).await.map_err(ApiError::from)
        })
        .await?;
    ok(page)
}

async fn listing_details(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> EnvelopeResult<Listing> {
    let listing_id: u64 = id
        .parse()
        .map_err(|_| ApiError::Validation(format!("invalid listing id: {id}")))?;

    let key = format!("listing:{listing_id}");
    let upstream = state.upstream.clone();
    let listing = state
        .cache
        .get_or_compute(&key, Some(state.ttls.listing()), || async move {
            upstream.listing_details(listing_id).await.map_err(ApiError::from)
        })
        .await?;
    ok(listing)
}

#[derive(Debug, Deserialize)]
struct RecentParams {
    count: Option<u32>,
}

async fn recent(
    State(state): State<Arc<AppState>>, query: Result<Query<RecentParams>, QueryRejection>,
) -> EnvelopeResult<Vec<Listing>> {
    let Query(params) = query.map_err(|e| ApiError::Validation(e.body_text()))?;
    let count = params.count.unwrap_or(10);

    let key = format!("recent:{count}");
    let upstream = state.upstream.clone();
    let listings = state
        .cache
        .get_or_compute(&key, Some(state.ttls.recent()), || async move {
            upstream.recent_listings(count).await.map_err(ApiError::from)
        })
        .await?;
    ok(listings)
}

async fn categories(State(state): State<Arc<AppState>>) -> EnvelopeResult<serde_json::Value> {
    let upstream = state.upstream.clone();
    let tree = state
        .cache
        .get_or_compute("categories", Some(state.ttls.categories()), || async move {
            upstream.categories().await.map_err(ApiError::from)
        })
        .await?;
    ok(tree)
}

async fn market_overview(State(state): State<Arc<AppState>>) -> EnvelopeResult<MarketOverview> {
    let analyzer = state.analyzer.clone();
    let overview = state
        .cache
        .get_or_compute("market:overview", Some(state.ttls.stats()), || async move {
            analyzer.market_overview().await.map_err(ApiError::from)
        })
        .await?;
    ok(overview)
}

#[derive(Debug, Deserialize)]
struct BrandParams {
    region: Option<String>,
}

async fn brand_stats(
    State(state): State<Arc<AppState>>, query: Result<Query<BrandParams>, QueryRejection>,
) -> EnvelopeResult<Vec<BrandStat>> {
    let Query(params) = query.map_err(|e| ApiError::Validation(e.body_text()))?;

    let key = format!("brands:stats:{}", params.region.as_deref().unwrap_or("all"));
    let analyzer = state.analyzer.clone();
    let stats = state
        .cache
        .get_or_compute(&key, Some(state.ttls.stats()), || async move {
            analyzer
                .brand_statistics(params.region.as_deref())
                .await
                .map_err(ApiError::from)
        })
        .await?;
    ok(stats)
}

async fn model_stats(State(state): State<Arc<AppState>>, Path(make): Path<String>) -> EnvelopeResult<Vec<ModelStat>> {
    if make.trim().is_empty() {
        return Err(ApiError::Validation("make must not be empty".into()));
    }

    let key = format!("models:stats:{make}");
    let analyzer = state.analyzer.clone();
    let stats = state
        .cache
        .get_or_compute(&key, Some(state.ttls.stats()), || async move {
            analyzer.model_statistics(&make).await.map_err(ApiError::from)
        })
        .await?;
    ok(stats)
}

async fn region_stats(State(state): State<Arc<AppState>>) -> EnvelopeResult<Vec<RegionStat>> {
    let analyzer = state.analyzer.clone();
    let stats = state
        .cache
        .get_or_compute("regions:stats", Some(state.ttls.stats()), || async move {
            analyzer.region_statistics(&OVERVIEW_REGIONS).await.map_err(ApiError::from)
        })
        .await?;
    ok(stats)
}

async fn market_insights(State(state): State<Arc<AppState>>) -> EnvelopeResult<MarketInsights> {
    let analyzer = state.analyzer.clone();
    let insights = state
        .cache
        .get_or_compute("market:insights", Some(state.ttls.stats()), || async move {
            analyzer.market_insights().await.map_err(ApiError::from)
        })
        .await?;
    ok(insights)
}

async fn health() -> EnvelopeResult<serde_json::Value> {
    ok(serde_json::json!({ "status": "ok" }))
}
