//! Marketplace API client.
//!
//! Provides a client for the upstream used-motors marketplace API with
//! request signing, parameter validation, and typed failures.
//!
//! ### Behavior
//!
//! - **Endpoints**: paginated search (`/Search/Motors/Used.json`),
//!   detail-by-id (`/Listings/{id}.json`), categories
//!   (`/Categories/UsedMotors.json`).
//! - **Authentication**: `Authorization` header produced by a pluggable
//!   [`RequestSigner`] (static bearer token or per-request HMAC).
//! - **Failure surfacing**: a single failed call surfaces immediately as a
//!   typed [`UpstreamError`]; retrying is a policy decision that belongs to
//!   callers, never to this client.

pub mod auth;
pub mod error;
pub mod request;
pub mod response;

pub use auth::{BearerSigner, HmacSigner, RequestSigner};
pub use error::UpstreamError;
pub use request::{MAX_ROWS, SearchQuery};
pub use response::{Listing, SearchPage};

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header;

/// Default base URL for the upstream marketplace API.
const DEFAULT_BASE_URL: &str = "https://api.trademe.co.nz/v1";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "motormarket/0.1";

/// Marketplace API client configuration.
#[derive(Debug, Clone)]
pub struct MarketplaceConfig {
    /// Base URL (default: https://api.trademe.co.nz/v1).
    pub base_url: String,
    /// Request timeout (default: 10s).
    pub timeout: Duration,
    /// User-agent string.
    pub user_agent: String,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// The upstream search/detail/category surface.
///
/// The aggregator and the HTTP boundary depend on this trait rather than on
/// the concrete client, so tests substitute a stub without touching
/// process-wide state.
#[async_trait]
pub trait Marketplace: Send + Sync {
    /// Search used-motor listings with optional filters.
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, UpstreamError>;

    /// Fetch a single listing by id.
    async fn listing_details(&self, listing_id: u64) -> Result<Listing, UpstreamError>;

    /// Fetch the category tree as an opaque passthrough.
    async fn categories(&self) -> Result<serde_json::Value, UpstreamError>;

    /// Fetch the newest listings, sized by `count`.
    async fn recent_listings(&self, count: u32) -> Result<Vec<Listing>, UpstreamError> {
        let query = SearchQuery { rows: Some(count), page: Some(1), ..Default::default() };
        Ok(self.search(&query).await?.listings)
    }
}

/// Marketplace API client.
#[derive(Clone)]
pub struct MarketplaceClient {
    http: reqwest::Client,
    config: MarketplaceConfig,
    signer: Arc<dyn RequestSigner>,
}

impl MarketplaceClient {
    /// Create a new client with the given configuration and signing scheme.
    pub fn new(config: MarketplaceConfig, signer: Arc<dyn RequestSigner>) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| UpstreamError::Network(Arc::new(e)))?;

        Ok(Self { http, config, signer })
    }

    /// Issue one signed GET and decode the 2xx body as JSON.
    ///
    /// Non-2xx responses surface as `Http { status, body }` with the
    /// upstream body kept for diagnostics.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self, path: &str, query: Option<&SearchQuery>,
    ) -> Result<T, UpstreamError> {
        let url = format!("{}{path}", self.config.base_url);
        let authorization = self.signer.authorization("GET", &url)?;

        let mut request = self
            .http
            .get(&url)
            .header(header::AUTHORIZATION, authorization)
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, &self.config.user_agent);
        if let Some(query) = query {
            request = request.query(query);
        }

        let start = Instant::now();
        let response = request.send().await.map_err(UpstreamError::from)?;
        let status = response.status();
        tracing::debug!(%status, path, elapsed = ?start.elapsed(), "upstream response");

        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Http { status: status.as_u16(), body });
        }

        let bytes = response.bytes().await.map_err(UpstreamError::from)?;
        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Parse(e.to_string()))
    }
}

#[async_trait]
impl Marketplace for MarketplaceClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, UpstreamError> {
        query.validate()?;

        tracing::debug!(?query, "searching upstream listings");
        self.get_json("/Search/Motors/Used.json", Some(query)).await
    }

    async fn listing_details(&self, listing_id: u64) -> Result<Listing, UpstreamError> {
        let result = self.get_json(&format!("/Listings/{listing_id}.json"), None).await;

        match result {
            Err(UpstreamError::Http { status: 404, .. }) => Err(UpstreamError::NotFound { listing_id }),
            other => other,
        }
    }

    async fn categories(&self) -> Result<serde_json::Value, UpstreamError> {
        self.get_json("/Categories/UsedMotors.json", None).await
    }
}
