// src/ingest/providers/http.rs
use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::ingest::feed::parse_feed;
use crate::ingest::types::{FeedSource, ParsedFeed};

/// Feed source fetched over HTTP(S). One GET per `fetch`, no retry.
pub struct HttpFeedSource {
    url: String,
    client: reqwest::Client,
}

impl HttpFeedSource {
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// One shared client for all feed URLs, in the given order.
pub fn sources_from_urls(
    urls: &[String],
    timeout: Option<std::time::Duration>,
) -> Result<Vec<Box<dyn FeedSource>>> {
    let mut builder =
        reqwest::Client::builder().user_agent(concat!("asset-insight/", env!("CARGO_PKG_VERSION")));
    if let Some(t) = timeout {
        builder = builder.timeout(t);
    }
    let client = builder.build().context("building feed http client")?;

    Ok(urls
        .iter()
        .map(|u| Box::new(HttpFeedSource::new(u.clone(), client.clone())) as Box<dyn FeedSource>)
        .collect())
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> Result<ParsedFeed> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("GET {}", self.url))?
            .error_for_status()
            .with_context(|| format!("GET {} status", self.url))?;
        let body = resp
            .text()
            .await
            .with_context(|| format!("reading body of {}", self.url))?;
        parse_feed(&body).with_context(|| format!("feed at {}", self.url))
    }

    fn name(&self) -> &str {
        &self.url
    }
}
