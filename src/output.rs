//! Output formatting and persistence for token summaries.
//!
//! Supports a grid table for the console, CSV write, and CSV read-back.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing::debug;

use crate::analyzers::types::TokenSummary;
use crate::snapshot::TokenSnapshot;

/// Renders summaries as an ASCII grid with one column per field.
pub fn render_table(summaries: &[TokenSummary]) -> String {
    let mut builder = Builder::default();
    builder.push_record(TokenSummary::COLUMNS);
    for summary in summaries {
        builder.push_record(summary.cells());
    }

    let mut table = builder.build();
    table.with(Style::ascii());
    table.to_string()
}

/// Logs summaries using Rust's debug pretty-print format.
pub fn print_pretty(summaries: &[TokenSummary]) {
    for summary in summaries {
        debug!("{:#?}", summary);
    }
}

/// Writes summaries to a CSV file, replacing any existing file.
///
/// The header row is always written, so an empty input produces a header-only file.
pub fn write_summaries(path: impl AsRef<Path>, summaries: &[TokenSummary]) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), rows = summaries.len(), "Writing summary CSV");

    write_rows(path, &TokenSummary::COLUMNS, summaries)
}

/// Reads summaries back from a CSV written by [`write_summaries`].
pub fn read_summaries(path: impl AsRef<Path>) -> Result<Vec<TokenSummary>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let record: TokenSummary = result.with_context(|| format!("malformed row in {}", path.display()))?;
        rows.push(record);
    }

    Ok(rows)
}

/// Writes raw snapshots to a CSV file, replacing any existing file.
///
/// Like [`write_summaries`], an empty input still produces the header row.
pub fn write_snapshots(path: impl AsRef<Path>, snapshots: &[TokenSnapshot]) -> Result<()> {
    write_rows(path.as_ref(), &TokenSnapshot::COLUMNS, snapshots)
}

fn write_rows<T: Serialize>(path: &Path, columns: &[&str], rows: &[T]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    writer.write_record(columns)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Timeframe;
    use chrono::Utc;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn sample() -> Vec<TokenSummary> {
        vec![
            TokenSummary {
                address: "0xABC".to_string(),
                id: Some("17".to_string()),
                chain: Some("sol".to_string()),
                symbol: Some("ABC, Inc".to_string()),
                avg_price: Some(0.000123),
                avg_volume: Some(2500.5),
                median_market_cap: Some(25000.0),
                consistency_count: 4,
                avg_price_change: Some(-12.75),
            },
            TokenSummary {
                address: "0xDEF".to_string(),
                id: None,
                chain: Some("sol".to_string()),
                symbol: None,
                avg_price: None,
                avg_volume: Some(1000.0),
                median_market_cap: Some(10000.0),
                consistency_count: 3,
                avg_price_change: None,
            },
        ]
    }

    #[test]
    fn test_render_table_has_header_and_rows() {
        let table = render_table(&sample());

        let header = table.lines().nth(1).unwrap();
        assert!(header.contains("address"));
        assert!(header.contains("consistency_count"));
        assert!(table.contains("0xABC"));
        assert!(table.contains("0xDEF"));
        assert!(table.starts_with('+'));
    }

    #[test]
    fn test_render_empty_table_still_has_header() {
        let table = render_table(&[]);
        assert!(table.contains("median_market_cap"));
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&sample());
    }

    #[test]
    fn test_csv_round_trip() {
        let path = temp_path("trending_aggregator_test_round_trip.csv");
        let _ = fs::remove_file(&path);

        let rows = sample();
        write_summaries(&path, &rows).unwrap();
        let back = read_summaries(&path).unwrap();

        assert_eq!(back, rows);
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content.lines().next().unwrap(),
            "address,id,chain,symbol,avg_price,avg_volume,median_market_cap,consistency_count,avg_price_change"
        );

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_empty_csv_is_header_only() {
        let path = temp_path("trending_aggregator_test_empty.csv");
        let _ = fs::remove_file(&path);

        write_summaries(&path, &[]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(read_summaries(&path).unwrap().is_empty());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_summaries_overwrites() {
        let path = temp_path("trending_aggregator_test_overwrite.csv");
        let _ = fs::remove_file(&path);

        write_summaries(&path, &sample()).unwrap();
        write_summaries(&path, &sample()[..1]).unwrap();

        assert_eq!(read_summaries(&path).unwrap().len(), 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_empty_snapshots_is_header_only() {
        let path = temp_path("trending_aggregator_test_empty_snapshots.csv");
        let _ = fs::remove_file(&path);

        write_snapshots(&path, &[]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content.trim_end(),
            "id,chain,address,symbol,price,volume,market_cap,timeframe,price_change,fetched_at"
        );

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_snapshots() {
        let path = temp_path("trending_aggregator_test_snapshots.csv");
        let _ = fs::remove_file(&path);

        let snapshot = TokenSnapshot {
            id: Some("1".to_string()),
            chain: Some("sol".to_string()),
            address: Some("0xABC".to_string()),
            symbol: Some("ABC".to_string()),
            price: Some(1.5),
            volume: None,
            market_cap: Some(20000.0),
            timeframe: Timeframe::FiveMinutes,
            price_change: None,
            fetched_at: Utc::now(),
        };
        write_snapshots(&path, &[snapshot]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("id,chain,address,symbol,price,volume,market_cap,timeframe"));
        assert!(lines[1].contains(",5m,"));

        fs::remove_file(&path).unwrap();
    }
}
