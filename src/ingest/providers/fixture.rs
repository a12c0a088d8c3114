// src/ingest/providers/fixture.rs
use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::ingest::feed::parse_feed;
use crate::ingest::types::{FeedSource, ParsedFeed};

/// Feed source backed by an in-memory XML document. No network.
pub struct FixtureFeedSource {
    name: String,
    content: String,
}

impl FixtureFeedSource {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

#[async_trait]
impl FeedSource for FixtureFeedSource {
    async fn fetch(&self) -> Result<ParsedFeed> {
        parse_feed(&self.content).with_context(|| format!("fixture feed {}", self.name))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
