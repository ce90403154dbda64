use crate::analyzers::types::TokenSummary;
use crate::analyzers::utility::{mean, median};
use crate::snapshot::{Timeframe, TokenSnapshot};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Running state for one address while snapshots are folded in.
#[derive(Default)]
struct Group {
    id: Option<String>,
    chain: Option<String>,
    symbol: Option<String>,
    prices: Vec<f64>,
    volumes: Vec<f64>,
    market_caps: Vec<f64>,
    price_changes: Vec<f64>,
    timeframes: BTreeSet<Timeframe>,
}

impl Group {
    fn push(&mut self, s: &TokenSnapshot) {
        // First non-null value wins.
        if self.id.is_none() {
            self.id = s.id.clone();
        }
        if self.chain.is_none() {
            self.chain = s.chain.clone();
        }
        if self.symbol.is_none() {
            self.symbol = s.symbol.clone();
        }

        self.prices.extend(s.price);
        self.volumes.extend(s.volume);
        self.market_caps.extend(s.market_cap);
        self.price_changes.extend(s.price_change);
        self.timeframes.insert(s.timeframe);
    }

    fn finish(self, address: String) -> TokenSummary {
        TokenSummary {
            address,
            id: self.id,
            chain: self.chain,
            symbol: self.symbol,
            avg_price: mean(&self.prices),
            avg_volume: mean(&self.volumes),
            median_market_cap: median(&self.market_caps),
            consistency_count: self.timeframes.len(),
            avg_price_change: mean(&self.price_changes),
        }
    }
}

/// Groups snapshots by address and reduces each group to a [`TokenSummary`].
///
/// Null price, volume, market cap and price change values are left out of their
/// statistics rather than counted as zero. `consistency_count` counts distinct
/// timeframes, not snapshots. Snapshots without an address are dropped.
/// Summaries are returned ordered by address.
pub fn aggregate_snapshots(snapshots: &[TokenSnapshot]) -> Vec<TokenSummary> {
    let mut groups: BTreeMap<&str, Group> = BTreeMap::new();
    let mut dropped = 0usize;

    for snapshot in snapshots {
        match snapshot.address.as_deref() {
            Some(address) => groups.entry(address).or_default().push(snapshot),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(dropped, "Snapshots without an address were skipped");
    }

    groups
        .into_iter()
        .map(|(address, group)| group.finish(address.to_string()))
        .collect()
}
