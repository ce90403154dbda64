//! Trait for interacting with a trending-token ranking provider.

use anyhow::Result;

use crate::snapshot::{RawToken, Timeframe};

/// Abstraction over a provider of ranked trending tokens (e.g. gmgn).
#[async_trait::async_trait]
pub trait TrendingSource {
    /// Returns the ranked token records for one timeframe, in ranking order.
    async fn trending_tokens(&self, timeframe: Timeframe) -> Result<Vec<RawToken>>;
}
