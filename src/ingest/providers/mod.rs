// src/ingest/providers/mod.rs
pub mod fixture;
pub mod http;

pub use fixture::FixtureFeedSource;
pub use http::{sources_from_urls, HttpFeedSource};
