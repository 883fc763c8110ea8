//! Derived statistic types and classification helpers.
//!
//! Everything in this module is computed from one or more search pages and
//! lives only as long as the cache entry wrapping it; nothing is persisted.

use motormarket_client::Listing;
use serde::{Deserialize, Serialize};

/// Fuel bucket name for listings with no usable fuel type.
pub const UNKNOWN_FUEL: &str = "Unknown";

/// Price band labels, lower bound inclusive, in ascending order.
pub const PRICE_BANDS: [&str; 5] = ["0-10k", "10-20k", "20-30k", "30-40k", "40k+"];

/// Listing volume for one brand.
///
/// `average_price` and `change_percent` are always `None`: the count comes
/// from a rows:1 query that carries no prices, and no historical snapshot
/// store exists to derive a change from. They are serialized as `null`
/// rather than fabricated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrandStat {
    pub name: String,
    pub count: u64,
    pub average_price: Option<u64>,
    pub change_percent: Option<f64>,
}

impl BrandStat {
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self { name: name.into(), count, average_price: None, change_percent: None }
    }

    /// Placeholder entry for a brand whose count query failed.
    pub fn zero(name: impl Into<String>) -> Self {
        Self::new(name, 0)
    }
}

/// Brand breakdown for one region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionStat {
    pub region: String,
    pub brands: Vec<BrandStat>,
}

/// Listing volume and sampled average price for one model.
///
/// Sampled: computed from a single fetched page, not the full population
/// for the brand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelStat {
    pub name: String,
    pub count: u64,
    pub average_price: u64,
}

/// Composed market snapshot.
///
/// `total_listings` is the sum of the candidate-brand counts. The candidate
/// list is not exhaustive, so this is a lower bound on true market size,
/// not an exact count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketOverview {
    pub total_listings: u64,
    pub regions: Vec<RegionStat>,
    pub top_brands: Vec<BrandStat>,
    pub recent_listings: Vec<Listing>,
}

/// Share of one fuel type within the analyzed sample.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FuelTypeShare {
    pub name: String,
    pub count: u64,
    pub percent: u64,
}

/// Listing volume within one price band.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceBand {
    pub range: String,
    pub count: u64,
    pub percent: u64,
}

/// Sampled fuel-type and price-band distributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketInsights {
    pub fuel_types: Vec<FuelTypeShare>,
    pub price_ranges: Vec<PriceBand>,
    /// The sample size actually fetched; percentages are computed against
    /// this, and a zero sample reports every share as 0.
    pub total_analyzed: u64,
}

/// Classify a start price into its band. Lower bounds are inclusive.
pub fn price_band(price: u64) -> &'static str {
    match price {
        0..10_000 => PRICE_BANDS[0],
        10_000..20_000 => PRICE_BANDS[1],
        20_000..30_000 => PRICE_BANDS[2],
        30_000..40_000 => PRICE_BANDS[3],
        _ => PRICE_BANDS[4],
    }
}

/// Fuel bucket for a listing; absent values map to [`UNKNOWN_FUEL`].
pub fn fuel_bucket(listing: &Listing) -> &str {
    if listing.fuel_type.is_empty() { UNKNOWN_FUEL } else { &listing.fuel_type }
}

/// Integer percentage of `count` within `total`, 0 when `total` is 0.
pub fn percent_of(count: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_band_lower_bound_inclusive() {
        assert_eq!(price_band(9_999), "0-10k");
        assert_eq!(price_band(10_000), "10-20k");
        assert_eq!(price_band(19_999), "10-20k");
        assert_eq!(price_band(20_000), "20-30k");
        assert_eq!(price_band(30_000), "30-40k");
        assert_eq!(price_band(39_999), "30-40k");
        assert_eq!(price_band(40_000), "40k+");
        assert_eq!(price_band(0), "0-10k");
    }

    #[test]
    fn test_fuel_bucket_maps_absent_to_unknown() {
        let listing = Listing { fuel_type: String::new(), ..Default::default() };
        assert_eq!(fuel_bucket(&listing), UNKNOWN_FUEL);

        let listing = Listing { fuel_type: "Diesel".into(), ..Default::default() };
        assert_eq!(fuel_bucket(&listing), "Diesel");
    }

    #[test]
    fn test_percent_of_zero_total() {
        assert_eq!(percent_of(0, 0), 0);
        assert_eq!(percent_of(5, 0), 0);
    }

    #[test]
    fn test_percent_of_rounds_to_nearest() {
        assert_eq!(percent_of(1, 3), 33);
        assert_eq!(percent_of(2, 3), 67);
        assert_eq!(percent_of(1, 2), 50);
    }

    #[test]
    fn test_brand_stat_placeholders_not_fabricated() {
        let stat = BrandStat::new("Toyota", 120);
        assert!(stat.average_price.is_none());
        assert!(stat.change_percent.is_none());

        let value = serde_json::to_value(&stat).unwrap();
        assert_eq!(value["average_price"], serde_json::Value::Null);
        assert_eq!(value["change_percent"], serde_json::Value::Null);
    }
}
