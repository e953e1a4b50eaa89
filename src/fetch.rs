//! HTTP fetch seam.
//!
//! Retrieval, discovery, and the liveness probe all go through [`Fetcher`] so
//! tests can drive them from fixtures instead of the network. The production
//! implementation is a thin wrapper over a shared `reqwest` client.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

const USER_AGENT: &str = "interpelli-ingest/0.1 (+https://github.com/interpelli)";

/// A fetched HTTP response, reduced to what the pipeline needs.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET a URL, following redirects. Non-2xx statuses are returned, not
    /// errors; callers decide what a usable response is.
    async fn get(&self, url: &str, timeout: Duration) -> Result<FetchedPage>;

    /// HEAD a URL and return the status code. Used as an existence probe.
    async fn head_status(&self, url: &str, timeout: Duration) -> Result<u16>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("building http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str, timeout: Duration) -> Result<FetchedPage> {
        let resp = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();
        let body = resp
            .text()
            .await
            .with_context(|| format!("reading body of {url}"))?;
        Ok(FetchedPage {
            status,
            content_type,
            body,
        })
    }

    async fn head_status(&self, url: &str, timeout: Duration) -> Result<u16> {
        let resp = self
            .client
            .head(url)
            .timeout(timeout)
            .send()
            .await
            .with_context(|| format!("HEAD {url}"))?;
        Ok(resp.status().as_u16())
    }
}
