//! Token aggregation and threshold filtering.
//!
//! Snapshots are grouped by address into [`types::TokenSummary`] rows, then
//! filtered against [`types::Thresholds`] and ranked by consistency and volume.

pub mod aggregate;
pub mod filter;
pub mod types;
pub mod utility;
