//! Token snapshot types: the per-timeframe rows produced by the fetcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A trending-list window supported by the upstream ranking endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "24h")]
    OneDay,
}

impl Timeframe {
    /// Every timeframe, in the order they are queried.
    pub const ALL: [Timeframe; 5] = [
        Timeframe::OneMinute,
        Timeframe::FiveMinutes,
        Timeframe::OneHour,
        Timeframe::SixHours,
        Timeframe::OneDay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneMinute => "1m",
            Timeframe::FiveMinutes => "5m",
            Timeframe::OneHour => "1h",
            Timeframe::SixHours => "6h",
            Timeframe::OneDay => "24h",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.as_str() == s.trim())
            .ok_or_else(|| anyhow::anyhow!("unknown timeframe '{s}' (expected one of 1m, 5m, 1h, 6h, 24h)"))
    }
}

/// One token record as returned inside the upstream `rank` list.
///
/// Every field is optional: a missing key, an explicit `null`, or a value of the
/// wrong shape all decode to `None`. Numeric fields also accept numeric strings;
/// non-finite numbers (`"NaN"`, `"inf"`, overflowing literals) decode to `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawToken {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub chain: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub market_cap: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_change_percent: Option<f64>,
}

/// One observation of a token within one timeframe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenSnapshot {
    pub id: Option<String>,
    pub chain: Option<String>,
    pub address: Option<String>,
    pub symbol: Option<String>,
    pub price: Option<f64>,
    pub volume: Option<f64>,
    pub market_cap: Option<f64>,
    pub timeframe: Timeframe,
    pub price_change: Option<f64>,
    pub fetched_at: DateTime<Utc>,
}

impl TokenSnapshot {
    /// Column names, in serialization order.
    pub const COLUMNS: [&'static str; 10] = [
        "id",
        "chain",
        "address",
        "symbol",
        "price",
        "volume",
        "market_cap",
        "timeframe",
        "price_change",
        "fetched_at",
    ];

    /// Flattens an upstream record into a snapshot tagged with `timeframe`.
    pub fn from_raw(raw: RawToken, timeframe: Timeframe, fetched_at: DateTime<Utc>) -> Self {
        TokenSnapshot {
            id: raw.id,
            chain: raw.chain,
            address: raw.address,
            symbol: raw.symbol,
            price: raw.price,
            volume: raw.volume,
            market_cap: raw.market_cap,
            timeframe,
            price_change: raw.price_change_percent,
            fetched_at,
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite()))
}
