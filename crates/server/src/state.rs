//! Shared application state.
//!
//! Every collaborator is constructed explicitly at startup and handed in
//! here; there are no process-wide singletons, so tests assemble a state
//! around a stub upstream without touching global state.

use std::sync::Arc;

use motormarket_client::Marketplace;
use motormarket_core::{CacheTtls, MemoryCache};

use crate::market::MarketAnalyzer;

/// Dependencies shared by every request handler.
pub struct AppState {
    pub upstream: Arc<dyn Marketplace>,
    pub cache: Arc<MemoryCache>,
    pub analyzer: MarketAnalyzer,
    pub ttls: CacheTtls,
}

impl AppState {
    /// Administrative cache busting: remove every key matching `pattern`.
    ///
    /// Internal operation only; deliberately not exposed on the public
    /// statistics surface.
    pub async fn invalidate_cache(&self, pattern: &str) -> Result<usize, motormarket_core::Error> {
        self.cache.invalidate(pattern).await
    }
}
