mod basic;
mod client;
mod headers;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use headers::BrowserHeaders;

use anyhow::{Result, bail};
use tracing::debug;

/// Issues a GET for `url` and returns the body.
///
/// # Errors
///
/// Fails on transport errors and on any non-success HTTP status.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("GET {url} returned status {status}: {body}");
    }

    let bytes = resp.bytes().await?;
    debug!(url, bytes = bytes.len(), "Response received");
    Ok(bytes.to_vec())
}
