use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::fetch::{BasicClient, BrowserHeaders, HttpClient, fetch_bytes};
use crate::parser::parse_trending;
use crate::services::trending_api::TrendingSource;
use crate::snapshot::{RawToken, Timeframe};

pub const DEFAULT_BASE_URL: &str = "https://gmgn.ai";
pub const DEFAULT_CHAIN: &str = "sol";

/// Client for the gmgn swap-ranking endpoint.
pub struct GmgnClient<C = BrowserHeaders<BasicClient>> {
    http: C,
    base_url: String,
    chain: String,
}

impl GmgnClient {
    /// Creates a client that talks to `base_url` with browser-like headers.
    pub fn new(base_url: &str, chain: &str) -> Result<Self> {
        let http = browser_headers(BasicClient::new()?, base_url, chain)?;
        Ok(Self::with_http(http, base_url, chain))
    }
}

/// Wraps `inner` so every request carries the site's Referer and Origin.
fn browser_headers<C: HttpClient>(inner: C, base_url: &str, chain: &str) -> Result<BrowserHeaders<C>> {
    let origin = base_url.trim_end_matches('/');
    let referer = format!("{origin}/?chain={chain}");
    BrowserHeaders::new(inner, &referer)?.with_header("origin", origin)
}

impl<C: HttpClient> GmgnClient<C> {
    pub fn with_http(http: C, base_url: &str, chain: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            chain: chain.to_string(),
        }
    }

    fn rank_url(&self, timeframe: Timeframe) -> String {
        format!(
            "{}/defi/quotation/v1/rank/{}/swaps/{}?orderby=swaps&direction=desc",
            self.base_url, self.chain, timeframe
        )
    }
}

#[async_trait]
impl<C: HttpClient> TrendingSource for GmgnClient<C> {
    async fn trending_tokens(&self, timeframe: Timeframe) -> Result<Vec<RawToken>> {
        let url = self.rank_url(timeframe);
        debug!(%url, "Requesting trending rank");

        let bytes = fetch_bytes(&self.http, &url)
            .await
            .with_context(|| format!("failed to fetch trending tokens for {timeframe}"))?;
        let response = parse_trending(&bytes)
            .with_context(|| format!("failed to decode trending tokens for {timeframe}"))?;

        Ok(response.into_tokens())
    }
}
