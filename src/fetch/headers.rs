use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// An [`HttpClient`] wrapper that sets a fixed set of headers on every request.
///
/// Headers already present on the request are overwritten.
pub struct BrowserHeaders<C> {
    pub inner: C,
    headers: HeaderMap,
}

impl<C> BrowserHeaders<C> {
    /// Wraps `inner` with the headers a desktop browser sends when visiting `referer`.
    pub fn new(inner: C, referer: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(reqwest::header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        headers.insert(reqwest::header::ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(reqwest::header::REFERER, HeaderValue::from_str(referer)?);
        Ok(Self { inner, headers })
    }

    /// Adds or replaces one header.
    pub fn with_header(mut self, name: &str, value: &str) -> anyhow::Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        self.headers.insert(name, HeaderValue::from_str(value)?);
        Ok(self)
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for BrowserHeaders<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        for (name, value) in &self.headers {
            req.headers_mut().insert(name.clone(), value.clone());
        }
        self.inner.execute(req).await
    }
}
