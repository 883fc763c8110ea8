//! Marketplace search request types and validation.

use serde::{Deserialize, Serialize};

/// Maximum rows the upstream search endpoint returns per page.
pub const MAX_ROWS: u32 = 500;

/// Filter parameters for the used-motors search endpoint.
///
/// Every filter is optional. Absent filters are omitted from the outgoing
/// query string entirely rather than sent as empty values; the upstream
/// treats an empty `make=` differently from no `make` at all.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SearchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_min: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_max: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_min: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_max: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub odometer_min: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub odometer_max: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_style: Option<String>,

    /// 1-based page number (default 1 upstream).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Rows per page (default 20 upstream, capped at 500).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
}

impl SearchQuery {
    /// Validate the search parameters.
    pub fn validate(&self) -> Result<(), crate::marketplace::UpstreamError> {
        use crate::marketplace::UpstreamError;

        if let Some(rows) = self.rows
            && !(1..=MAX_ROWS).contains(&rows)
        {
            return Err(UpstreamError::InvalidQuery(format!("rows must be 1-{MAX_ROWS}, got {rows}")));
        }

        if let Some(page) = self.page
            && page == 0
        {
            return Err(UpstreamError::InvalidQuery("page is 1-based".to_string()));
        }

        if let (Some(min), Some(max)) = (self.year_min, self.year_max)
            && min > max
        {
            return Err(UpstreamError::InvalidQuery(format!("year_min {min} exceeds year_max {max}")));
        }

        if let (Some(min), Some(max)) = (self.price_min, self.price_max)
            && min > max
        {
            return Err(UpstreamError::InvalidQuery(format!("price_min {min} exceeds price_max {max}")));
        }

        if let (Some(min), Some(max)) = (self.odometer_min, self.odometer_max)
            && min > max
        {
            return Err(UpstreamError::InvalidQuery(format!("odometer_min {min} exceeds odometer_max {max}")));
        }

        Ok(())
    }

    /// Get the effective page (default 1).
    pub fn get_page(&self) -> u32 {
        self.page.unwrap_or(1)
    }

    /// Get the effective rows per page (default 20).
    pub fn get_rows(&self) -> u32 {
        self.rows.unwrap_or(20)
    }
}
