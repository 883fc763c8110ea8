//! Marketplace API response types.
//!
//! The upstream wire format is PascalCase (`TotalCount`, `List`,
//! `StartPrice`, ...). Field renames keep that casing on the wire in both
//! directions while the Rust structs stay snake_case; the presentation layer
//! consumes the upstream casing unchanged. The upstream omits fields freely,
//! so everything optional-in-practice carries a default.

use serde::{Deserialize, Serialize};

/// A single upstream listing record.
///
/// Immutable as observed by this system; upstream is the source of truth
/// and nothing here is ever mutated locally.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct Listing {
    pub listing_id: u64,
    pub title: String,
    pub make: String,
    pub model: String,
    pub year: u32,
    pub odometer: u64,
    pub engine_size: u32,
    pub fuel_type: String,
    pub transmission: String,
    pub body_style: String,
    pub doors: u8,
    pub seats: u8,
    pub start_price: u64,
    pub buy_now_price: u64,
    pub region: String,
    pub suburb: String,
    pub picture_href: String,
    pub category_path: String,
    pub start_date: String,
    pub end_date: String,
    pub is_buy_now_only: bool,
    pub is_classified: bool,
}

/// One page of search results.
///
/// Produced fresh by every search call; pages are never merged or
/// deduplicated here. `total_count` covers the whole result set, not just
/// this page.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct SearchPage {
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    #[serde(rename = "List")]
    pub listings: Vec<Listing>,
}
