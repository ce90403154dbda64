//! JSON decoder for the upstream trending-rank response.

use anyhow::{Result, bail};
use serde::Deserialize;

use crate::snapshot::RawToken;

/// The envelope wrapping every ranking response.
#[derive(Debug, Deserialize)]
pub struct TrendingResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<TrendingData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendingData {
    #[serde(default)]
    pub rank: Vec<RawToken>,
}

impl TrendingResponse {
    /// Consumes the envelope, returning the ranked records.
    ///
    /// A response without `data` or without `rank` has no tokens.
    pub fn into_tokens(self) -> Vec<RawToken> {
        self.data.map(|d| d.rank).unwrap_or_default()
    }
}

/// Decodes a ranking response from raw bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid JSON for the envelope, or if the
/// upstream reports a non-zero status `code`.
pub fn parse_trending(bytes: &[u8]) -> Result<TrendingResponse> {
    let response: TrendingResponse = serde_json::from_slice(bytes)?;
    if response.code != 0 {
        bail!(
            "upstream returned code {}: {}",
            response.code,
            response.msg.as_deref().unwrap_or("<no message>")
        );
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_missing_rank_is_empty() {
        let response = parse_trending(br#"{"code": 0, "msg": "success", "data": {}}"#).unwrap();
        assert!(response.into_tokens().is_empty());
    }

    #[test]
    fn test_parse_missing_data_is_empty() {
        let response = parse_trending(br#"{"code": 0}"#).unwrap();
        assert!(response.into_tokens().is_empty());
    }

    #[test]
    fn test_parse_invalid_bytes() {
        assert!(parse_trending(&[0xFF, 0xFE, 0x00, 0x01]).is_err());
    }

    #[test]
    fn test_parse_nonzero_code_fails() {
        let err = parse_trending(br#"{"code": 40000, "msg": "rate limited"}"#).unwrap_err();
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn test_parse_rank_records() {
        let bytes = br#"{
            "code": 0,
            "data": {"rank": [
                {"id": 1, "address": "A", "symbol": "AAA", "volume": 1500.0},
                {"id": 2, "address": "B"}
            ]}
        }"#;
        let tokens = parse_trending(bytes).unwrap().into_tokens();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].symbol.as_deref(), Some("AAA"));
        assert_eq!(tokens[0].volume, Some(1500.0));
        assert_eq!(tokens[1].symbol, None);
    }
}
