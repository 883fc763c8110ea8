//! Market statistics aggregator.
//!
//! Answers statistical questions the upstream API cannot answer in one call
//! by fanning out concurrent searches and composing the results. Fan-outs
//! use a task group with per-task error capture: one failing sub-query
//! becomes a zero-valued placeholder instead of aborting the batch, and
//! results are re-keyed by brand/region name so concurrent completion order
//! never shows in the output.

pub mod stats;

pub use stats::{
    BrandStat, FuelTypeShare, MarketInsights, MarketOverview, ModelStat, PriceBand, RegionStat, fuel_bucket,
    percent_of, price_band,
};

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use motormarket_client::{Marketplace, SearchQuery, UpstreamError};
use tokio::task::JoinSet;

/// Candidate brands for count fan-outs. Not exhaustive; totals derived from
/// this list are lower bounds on the real market.
pub const CANDIDATE_BRANDS: [&str; 10] =
    ["Toyota", "Mazda", "Honda", "Nissan", "Ford", "Holden", "Mitsubishi", "Subaru", "Volkswagen", "BMW"];

/// Regions covered by the market overview.
pub const OVERVIEW_REGIONS: [&str; 4] = ["Auckland", "Canterbury", "Waikato", "Wellington"];

/// Brands kept per region in region statistics.
const TOP_BRANDS_PER_REGION: usize = 6;

/// Brands kept in the market overview.
const TOP_BRANDS_OVERALL: usize = 10;

/// Recent listings included in the market overview.
const OVERVIEW_RECENT_COUNT: u32 = 10;

/// Aggregation failures.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// The candidate brand list was empty; nothing to aggregate.
    #[error("no brands to aggregate")]
    NoBrands,

    /// Every sub-query in the batch failed.
    #[error("all upstream sub-queries failed")]
    AllQueriesFailed,

    /// A non-tolerated upstream failure.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Sample sizes for the single-page sampled statistics.
#[derive(Debug, Clone, Copy)]
pub struct SampleSizes {
    pub model_rows: u32,
    pub insights_rows: u32,
}

impl Default for SampleSizes {
    fn default() -> Self {
        Self { model_rows: 100, insights_rows: 500 }
    }
}

/// Composes upstream searches into derived market statistics.
///
/// Stateless and idempotent per call, modulo upstream data drift; takes its
/// upstream collaborator at construction so tests can substitute a stub.
#[derive(Clone)]
pub struct MarketAnalyzer {
    upstream: Arc<dyn Marketplace>,
    samples: SampleSizes,
}

impl MarketAnalyzer {
    pub fn new(upstream: Arc<dyn Marketplace>, samples: SampleSizes) -> Self {
        Self { upstream, samples }
    }

    /// Listing counts for the fixed candidate brands, optionally scoped to
    /// one region, sorted descending by count.
    pub async fn brand_statistics(&self, region: Option<&str>) -> Result<Vec<BrandStat>, AggregateError> {
        self.brand_statistics_for(&CANDIDATE_BRANDS, region).await
    }

    /// Listing counts for an explicit brand list.
    ///
    /// One `rows:1` search per brand, issued concurrently; only
    /// `total_count` is used. A failed sub-query records a zero-count entry
    /// for its brand. The whole call fails only when the list is empty or
    /// every sub-query failed.
    pub async fn brand_statistics_for(
        &self, brands: &[&str], region: Option<&str>,
    ) -> Result<Vec<BrandStat>, AggregateError> {
        if brands.is_empty() {
            return Err(AggregateError::NoBrands);
        }

        let mut queries = JoinSet::new();
        for brand in brands {
            let upstream = self.upstream.clone();
            let brand = brand.to_string();
            let region = region.map(str::to_string);
            queries.spawn(async move {
                let query = SearchQuery {
                    make: Some(brand.clone()),
                    region,
                    rows: Some(1),
                    page: Some(1),
                    ..Default::default()
                };
                (brand, upstream.search(&query).await)
            });
        }

        // Completion order is unconstrained; counts are re-associated to
        // their brand by name.
        let mut counts: HashMap<String, u64> = HashMap::new();
        while let Some(joined) = queries.join_next().await {
            let Ok((brand, result)) = joined else {
                continue;
            };
            match result {
                Ok(page) => {
                    counts.insert(brand, page.total_count);
                }
                Err(e) => {
                    tracing::warn!(brand, error = %e, "brand count query failed, recording zero");
                }
            }
        }

        if counts.is_empty() {
            return Err(AggregateError::AllQueriesFailed);
        }

        let mut out: Vec<BrandStat> = brands
            .iter()
            .map(|brand| match counts.get(*brand) {
                Some(count) => BrandStat::new(*brand, *count),
                None => BrandStat::zero(*brand),
            })
            .collect();
        out.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(out)
    }

    /// Per-region brand breakdowns, computed concurrently across regions,
    /// each truncated to the regional top brands. Output follows the
    /// caller's region order.
    pub async fn region_statistics(&self, regions: &[&str]) -> Result<Vec<RegionStat>, AggregateError> {
        let mut queries = JoinSet::new();
        for region in regions {
            let analyzer = self.clone();
            let region = region.to_string();
            queries.spawn(async move {
                let brands = analyzer.brand_statistics(Some(&region)).await;
                (region, brands)
            });
        }

        let mut by_region: HashMap<String, Vec<BrandStat>> = HashMap::new();
        while let Some(joined) = queries.join_next().await {
            let Ok((region, result)) = joined else {
                continue;
            };
            let mut brands = result?;
            brands.truncate(TOP_BRANDS_PER_REGION);
            by_region.insert(region, brands);
        }

        Ok(regions
            .iter()
            .map(|region| RegionStat {
                region: region.to_string(),
                brands: by_region.remove(*region).unwrap_or_default(),
            })
            .collect())
    }

    /// Composed market snapshot: regional breakdowns, recent listings, and
    /// top brands, fetched as three independent concurrent batches.
    pub async fn market_overview(&self) -> Result<MarketOverview, AggregateError> {
        let (regions, recent, brands) = tokio::join!(
            self.region_statistics(&OVERVIEW_REGIONS),
            self.upstream.recent_listings(OVERVIEW_RECENT_COUNT),
            self.brand_statistics(None),
        );

        let regions = regions?;
        let recent_listings = recent?;
        let mut top_brands = brands?;

        // Lower bound: the candidate list is not exhaustive.
        let total_listings = top_brands.iter().map(|b| b.count).sum();
        top_brands.truncate(TOP_BRANDS_OVERALL);

        Ok(MarketOverview { total_listings, regions, top_brands, recent_listings })
    }

    /// Sampled per-model statistics for one brand, descending by count.
    ///
    /// Groups a single fetched page (up to the configured sample size) by
    /// model name; the result reflects that sample, not the full population.
    pub async fn model_statistics(&self, make: &str) -> Result<Vec<ModelStat>, AggregateError> {
        let query = SearchQuery {
            make: Some(make.to_string()),
            rows: Some(self.samples.model_rows),
            page: Some(1),
            ..Default::default()
        };
        let page = self.upstream.search(&query).await?;

        let mut groups: BTreeMap<String, (u64, u64)> = BTreeMap::new();
        for listing in &page.listings {
            let entry = groups.entry(listing.model.clone()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += listing.start_price;
        }

        let mut out: Vec<ModelStat> = groups
            .into_iter()
            .map(|(name, (count, total_price))| ModelStat {
                name,
                count,
                average_price: (total_price as f64 / count as f64).round() as u64,
            })
            .collect();
        out.sort_by(|a, b| b.count.cmp(&a.count));

        tracing::debug!(make, models = out.len(), sampled = page.listings.len(), "model statistics computed");
        Ok(out)
    }

    /// Sampled fuel-type and price-band distributions over one large page.
    pub async fn market_insights(&self) -> Result<MarketInsights, AggregateError> {
        let query = SearchQuery { rows: Some(self.samples.insights_rows), page: Some(1), ..Default::default() };
        let page = self.upstream.search(&query).await?;

        let total_analyzed = page.listings.len() as u64;

        let mut fuel_counts: BTreeMap<String, u64> = BTreeMap::new();
        let mut band_counts: HashMap<&'static str, u64> = HashMap::new();
        for listing in &page.listings {
            *fuel_counts.entry(fuel_bucket(listing).to_string()).or_default() += 1;
            *band_counts.entry(price_band(listing.start_price)).or_default() += 1;
        }

        let mut fuel_types: Vec<FuelTypeShare> = fuel_counts
            .into_iter()
            .map(|(name, count)| FuelTypeShare { name, count, percent: percent_of(count, total_analyzed) })
            .collect();
        fuel_types.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

        let price_ranges = stats::PRICE_BANDS
            .iter()
            .map(|range| {
                let count = band_counts.get(range).copied().unwrap_or(0);
                PriceBand { range: range.to_string(), count, percent: percent_of(count, total_analyzed) }
            })
            .collect();

        Ok(MarketInsights { fuel_types, price_ranges, total_analyzed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use motormarket_client::{Listing, SearchPage};

    /// Stub upstream with canned per-brand counts and a canned sample page.
    struct StubUpstream {
        counts: HashMap<String, u64>,
        failing_makes: Vec<String>,
        sample: Vec<Listing>,
    }

    impl StubUpstream {
        fn with_counts(counts: &[(&str, u64)]) -> Self {
            Self {
                counts: counts.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
                failing_makes: Vec::new(),
                sample: Vec::new(),
            }
        }

        fn with_sample(sample: Vec<Listing>) -> Self {
            Self { counts: HashMap::new(), failing_makes: Vec::new(), sample }
        }

        fn failing_for(mut self, make: &str) -> Self {
            self.failing_makes.push(make.to_string());
            self
        }
    }

    #[async_trait]
    impl Marketplace for StubUpstream {
        async fn search(&self, query: &SearchQuery) -> Result<SearchPage, UpstreamError> {
            if let Some(make) = &query.make {
                if self.failing_makes.contains(make) {
                    return Err(UpstreamError::Http { status: 500, body: "boom".into() });
                }
                if let Some(count) = self.counts.get(make) {
                    return Ok(SearchPage { total_count: *count, page: 1, page_size: 1, listings: Vec::new() });
                }
            }

            let listings: Vec<Listing> = self
                .sample
                .iter()
                .filter(|l| query.make.as_deref().is_none_or(|make| l.make == make))
                .take(query.get_rows() as usize)
                .cloned()
                .collect();
            Ok(SearchPage {
                total_count: listings.len() as u64,
                page: query.get_page(),
                page_size: query.get_rows(),
                listings,
            })
        }

        async fn listing_details(&self, listing_id: u64) -> Result<Listing, UpstreamError> {
            Err(UpstreamError::NotFound { listing_id })
        }

        async fn categories(&self) -> Result<serde_json::Value, UpstreamError> {
            Ok(serde_json::json!([]))
        }
    }

    fn listing(make: &str, model: &str, price: u64, fuel: &str) -> Listing {
        Listing {
            make: make.into(),
            model: model.into(),
            start_price: price,
            fuel_type: fuel.into(),
            ..Default::default()
        }
    }

    fn analyzer(stub: StubUpstream) -> MarketAnalyzer {
        MarketAnalyzer::new(Arc::new(stub), SampleSizes::default())
    }

    #[tokio::test]
    async fn test_brand_statistics_sorted_descending() {
        let stub = StubUpstream::with_counts(&[("Toyota", 50), ("Mazda", 80), ("Honda", 10)]);
        let analyzer = analyzer(stub);

        let stats = analyzer
            .brand_statistics_for(&["Toyota", "Mazda", "Honda"], None)
            .await
            .unwrap();

        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0], BrandStat::new("Mazda", 80));
        assert_eq!(stats[1], BrandStat::new("Toyota", 50));
        assert_eq!(stats[2], BrandStat::new("Honda", 10));
        assert!(stats.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[tokio::test]
    async fn test_brand_statistics_tolerates_partial_failure() {
        let stub = StubUpstream::with_counts(&[("Toyota", 50), ("Honda", 10)]).failing_for("Mazda");
        let analyzer = analyzer(stub);

        let stats = analyzer
            .brand_statistics_for(&["Toyota", "Mazda", "Honda"], None)
            .await
            .unwrap();

        assert_eq!(stats.len(), 3);
        let mazda = stats.iter().find(|s| s.name == "Mazda").unwrap();
        assert_eq!(mazda.count, 0);
    }

    #[tokio::test]
    async fn test_brand_statistics_fails_when_all_fail() {
        let stub = StubUpstream::with_counts(&[])
            .failing_for("Toyota")
            .failing_for("Mazda");
        let analyzer = analyzer(stub);

        let result = analyzer.brand_statistics_for(&["Toyota", "Mazda"], None).await;
        assert!(matches!(result, Err(AggregateError::AllQueriesFailed)));
    }

    #[tokio::test]
    async fn test_brand_statistics_rejects_empty_list() {
        let analyzer = analyzer(StubUpstream::with_counts(&[("Toyota", 1)]));
        let result = analyzer.brand_statistics_for(&[], None).await;
        assert!(matches!(result, Err(AggregateError::NoBrands)));
    }

    #[tokio::test]
    async fn test_region_statistics_keeps_caller_order_and_truncates() {
        let stub = StubUpstream::with_counts(&[
            ("Toyota", 9),
            ("Mazda", 8),
            ("Honda", 7),
            ("Nissan", 6),
            ("Ford", 5),
            ("Holden", 4),
            ("Mitsubishi", 3),
            ("Subaru", 2),
            ("Volkswagen", 1),
            ("BMW", 1),
        ]);
        let analyzer = analyzer(stub);

        let stats = analyzer.region_statistics(&["Wellington", "Auckland"]).await.unwrap();

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].region, "Wellington");
        assert_eq!(stats[1].region, "Auckland");
        assert_eq!(stats[0].brands.len(), TOP_BRANDS_PER_REGION);
        assert_eq!(stats[0].brands[0].name, "Toyota");
    }

    #[tokio::test]
    async fn test_market_overview_total_is_sum_of_brand_counts() {
        let stub = StubUpstream::with_counts(&[
            ("Toyota", 100),
            ("Mazda", 50),
            ("Honda", 25),
            ("Nissan", 0),
            ("Ford", 0),
            ("Holden", 0),
            ("Mitsubishi", 0),
            ("Subaru", 0),
            ("Volkswagen", 0),
            ("BMW", 0),
        ]);
        let analyzer = analyzer(stub);

        let overview = analyzer.market_overview().await.unwrap();

        assert_eq!(overview.total_listings, 175);
        assert_eq!(overview.regions.len(), OVERVIEW_REGIONS.len());
        assert!(overview.top_brands.len() <= TOP_BRANDS_OVERALL);
        assert_eq!(overview.top_brands[0].name, "Toyota");
    }

    #[tokio::test]
    async fn test_model_statistics_groups_and_averages() {
        let sample = vec![
            listing("Toyota", "Corolla", 10_000, "Petrol"),
            listing("Toyota", "Corolla", 12_000, "Petrol"),
            listing("Toyota", "Corolla", 14_000, "Petrol"),
            listing("Toyota", "RAV4", 30_000, "Petrol"),
            listing("Toyota", "RAV4", 32_000, "Petrol"),
        ];
        let analyzer = analyzer(StubUpstream::with_sample(sample));

        let stats = analyzer.model_statistics("Toyota").await.unwrap();

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0], ModelStat { name: "Corolla".into(), count: 3, average_price: 12_000 });
        assert_eq!(stats[1], ModelStat { name: "RAV4".into(), count: 2, average_price: 31_000 });
    }

    #[tokio::test]
    async fn test_model_statistics_integer_rounding() {
        let sample = vec![
            listing("Mazda", "Demio", 10_001, "Petrol"),
            listing("Mazda", "Demio", 10_002, "Petrol"),
        ];
        let analyzer = analyzer(StubUpstream::with_sample(sample));

        let stats = analyzer.model_statistics("Mazda").await.unwrap();
        // 20_003 / 2 = 10_001.5, rounds half up.
        assert_eq!(stats[0].average_price, 10_002);
    }

    #[tokio::test]
    async fn test_market_insights_buckets_and_percentages() {
        let sample = vec![
            listing("Toyota", "Corolla", 9_999, "Petrol"),
            listing("Toyota", "Corolla", 10_000, "Petrol"),
            listing("Toyota", "Hilux", 45_000, "Diesel"),
            listing("Nissan", "Leaf", 15_000, ""),
        ];
        let analyzer = analyzer(StubUpstream::with_sample(sample));

        let insights = analyzer.market_insights().await.unwrap();

        assert_eq!(insights.total_analyzed, 4);

        let by_range: HashMap<&str, &PriceBand> =
            insights.price_ranges.iter().map(|b| (b.range.as_str(), b)).collect();
        assert_eq!(by_range["0-10k"].count, 1);
        assert_eq!(by_range["10-20k"].count, 2);
        assert_eq!(by_range["40k+"].count, 1);
        assert_eq!(by_range["20-30k"].count, 0);
        assert_eq!(by_range["10-20k"].percent, 50);

        assert_eq!(insights.fuel_types[0].name, "Petrol");
        assert_eq!(insights.fuel_types[0].count, 2);
        assert!(insights.fuel_types.iter().any(|f| f.name == stats::UNKNOWN_FUEL && f.count == 1));
    }

    #[tokio::test]
    async fn test_market_insights_empty_sample_has_zero_percentages() {
        let analyzer = analyzer(StubUpstream::with_sample(Vec::new()));

        let insights = analyzer.market_insights().await.unwrap();

        assert_eq!(insights.total_analyzed, 0);
        assert!(insights.fuel_types.is_empty());
        assert_eq!(insights.price_ranges.len(), 5);
        assert!(insights.price_ranges.iter().all(|b| b.count == 0 && b.percent == 0));
    }
}
