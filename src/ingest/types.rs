// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Source name used when a feed carries no usable title.
pub const UNKNOWN_SOURCE: &str = "Unknown Source";

/// One normalized news item as it leaves ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawItem {
    pub source: String, // feed title, e.g. "Cointelegraph.com News"
    pub title: String,
    pub summary: String,
    pub link: String,
    pub published: Option<String>, // raw feed timestamp, not parsed
}

impl RawItem {
    /// Identity used for cross-source dedup. Empty when both link and title are empty.
    pub fn dedup_key(&self) -> String {
        format!("{}{}", self.link, self.title)
    }

    /// Text handed to the scorer and the trigger classifier.
    pub fn scoring_text(&self) -> String {
        format!("{}\n{}", self.title, self.summary).trim().to_string()
    }
}

/// Entry fields exactly as the feed carried them (before trimming/fallbacks).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub link: Option<String>,
    pub published: Option<String>,
    pub updated: Option<String>,
}

/// A parsed feed document: channel title plus entries in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<FeedEntry>,
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<ParsedFeed>;
    fn name(&self) -> &str;
}
