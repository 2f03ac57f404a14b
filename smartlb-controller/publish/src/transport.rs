use anyhow::Result;
use http::{header, StatusCode};
use std::time::Duration;

/// Delivers a serialized snapshot to a URL.
///
/// Any status returned by the remote API is a successful delivery; only failures to complete the
/// exchange are errors.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<StatusCode>;
}

#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

// === impl HttpTransport ===

impl HttpTransport {
    /// Builds a client that bounds each request by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<StatusCode> {
        let rsp = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        Ok(rsp.status())
    }
}
