//! Fetches every requested timeframe and flattens the records into snapshots.

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use crate::services::trending_api::TrendingSource;
use crate::snapshot::{Timeframe, TokenSnapshot};

/// Requests each timeframe in order, one at a time, and returns all snapshots.
///
/// Output order is timeframe order, then the source's ranking order. The first
/// failing request aborts the collection.
#[tracing::instrument(skip_all, fields(timeframes = timeframes.len()))]
pub async fn collect_snapshots<S: TrendingSource + ?Sized>(
    source: &S,
    timeframes: &[Timeframe],
) -> Result<Vec<TokenSnapshot>> {
    let mut snapshots = Vec::new();

    for &timeframe in timeframes {
        let tokens = source.trending_tokens(timeframe).await?;
        let fetched_at = Utc::now();
        info!(%timeframe, count = tokens.len(), "Trending tokens fetched");

        snapshots.extend(
            tokens
                .into_iter()
                .map(|raw| TokenSnapshot::from_raw(raw, timeframe, fetched_at)),
        );
    }

    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::RawToken;
    use std::collections::HashMap;

    struct StaticSource(HashMap<Timeframe, Vec<RawToken>>);

    #[async_trait::async_trait]
    impl TrendingSource for StaticSource {
        async fn trending_tokens(&self, timeframe: Timeframe) -> Result<Vec<RawToken>> {
            match self.0.get(&timeframe) {
                Some(tokens) => Ok(tokens.clone()),
                None => anyhow::bail!("no data for {timeframe}"),
            }
        }
    }

    fn token(address: &str) -> RawToken {
        RawToken {
            address: Some(address.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_collect_preserves_timeframe_then_rank_order() {
        let source = StaticSource(HashMap::from([
            (Timeframe::OneMinute, vec![token("A"), token("B")]),
            (Timeframe::OneHour, vec![token("C")]),
        ]));

        let snapshots = collect_snapshots(&source, &[Timeframe::OneHour, Timeframe::OneMinute])
            .await
            .unwrap();

        let order: Vec<_> = snapshots
            .iter()
            .map(|s| (s.timeframe, s.address.clone().unwrap()))
            .collect();
        assert_eq!(
            order,
            vec![
                (Timeframe::OneHour, "C".to_string()),
                (Timeframe::OneMinute, "A".to_string()),
                (Timeframe::OneMinute, "B".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_collect_aborts_on_source_failure() {
        let source = StaticSource(HashMap::from([(Timeframe::OneMinute, vec![token("A")])]));

        let result = collect_snapshots(&source, &[Timeframe::OneMinute, Timeframe::FiveMinutes]).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_collect_empty_source() {
        let source = StaticSource(Timeframe::ALL.into_iter().map(|tf| (tf, vec![])).collect());

        let snapshots = collect_snapshots(&source, &Timeframe::ALL).await.unwrap();

        assert!(snapshots.is_empty());
    }
}
