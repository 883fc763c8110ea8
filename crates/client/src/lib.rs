//! Upstream client code for motormarket.
//!
//! This crate provides the authenticated marketplace API client shared by
//! the server: typed search/detail/category requests, pluggable request
//! signing, and typed failures.

pub mod marketplace;

pub use marketplace::{
    BearerSigner, HmacSigner, Listing, Marketplace, MarketplaceClient, MarketplaceConfig, RequestSigner, SearchPage,
    SearchQuery, UpstreamError,
};
