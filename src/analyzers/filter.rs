use crate::analyzers::types::{Thresholds, TokenSummary};
use std::cmp::Ordering;

/// Returns `true` when the summary meets every threshold. A null average volume
/// or median market cap never passes.
pub fn passes(summary: &TokenSummary, thresholds: &Thresholds) -> bool {
    summary.consistency_count >= thresholds.min_consistency
        && summary
            .avg_volume
            .is_some_and(|v| v >= thresholds.min_avg_volume)
        && summary
            .median_market_cap
            .is_some_and(|m| m >= thresholds.min_median_market_cap)
}

/// Keeps the summaries that pass `thresholds`, ordered by consistency count
/// descending, then average volume descending. The sort is stable.
pub fn filter_and_sort(summaries: Vec<TokenSummary>, thresholds: &Thresholds) -> Vec<TokenSummary> {
    let mut retained: Vec<_> = summaries
        .into_iter()
        .filter(|s| passes(s, thresholds))
        .collect();

    retained.sort_by(|a, b| {
        b.consistency_count
            .cmp(&a.consistency_count)
            .then_with(|| volume_desc(a.avg_volume, b.avg_volume))
    });

    retained
}

fn volume_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        _ => Ordering::Equal,
    }
}
