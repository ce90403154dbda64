//! Data types produced by the aggregation pipeline.

use serde::{Deserialize, Serialize};

/// Summary statistics for one token address across all fetched timeframes.
///
/// Field order is the column order of the table and CSV outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSummary {
    pub address: String,
    pub id: Option<String>,
    pub chain: Option<String>,
    pub symbol: Option<String>,
    pub avg_price: Option<f64>,
    pub avg_volume: Option<f64>,
    pub median_market_cap: Option<f64>,
    pub consistency_count: usize,
    pub avg_price_change: Option<f64>,
}

impl TokenSummary {
    /// Column names, in output order.
    pub const COLUMNS: [&'static str; 9] = [
        "address",
        "id",
        "chain",
        "symbol",
        "avg_price",
        "avg_volume",
        "median_market_cap",
        "consistency_count",
        "avg_price_change",
    ];

    /// Renders each field as display text, empty for nulls.
    pub fn cells(&self) -> [String; 9] {
        fn text(v: &Option<String>) -> String {
            v.clone().unwrap_or_default()
        }
        fn num(v: Option<f64>) -> String {
            v.map(|v| v.to_string()).unwrap_or_default()
        }

        [
            self.address.clone(),
            text(&self.id),
            text(&self.chain),
            text(&self.symbol),
            num(self.avg_price),
            num(self.avg_volume),
            num(self.median_market_cap),
            self.consistency_count.to_string(),
            num(self.avg_price_change),
        ]
    }
}

/// Minimum values a summary must reach to be reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub min_consistency: usize,
    pub min_avg_volume: f64,
    pub min_median_market_cap: f64,
}

pub const MIN_CONSISTENCY: usize = 3;
pub const MIN_AVG_VOLUME: f64 = 1000.0;
pub const MIN_MEDIAN_MARKET_CAP: f64 = 10_000.0;

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_consistency: MIN_CONSISTENCY,
            min_avg_volume: MIN_AVG_VOLUME,
            min_median_market_cap: MIN_MEDIAN_MARKET_CAP,
        }
    }
}
