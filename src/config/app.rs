// src/config/app.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf};

pub const ENV_CONFIG_PATH: &str = "INSIGHT_CONFIG_PATH";
pub const ENV_HISTORY_PATH: &str = "INSIGHT_HISTORY_PATH";
pub const ENV_BIND_ADDR: &str = "INSIGHT_BIND_ADDR";
pub const DEFAULT_CONFIG_PATH: &str = "config/insight.toml";

const DEFAULT_FEEDS: [&str; 3] = [
    "https://cointelegraph.com/rss",
    "https://www.coindesk.com/arc/outboundfeeds/rss/",
    "https://news.bitcoin.com/feed/",
];

fn default_history_path() -> PathBuf {
    PathBuf::from("output/history.csv")
}
fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}
fn default_feeds() -> Vec<String> {
    DEFAULT_FEEDS.iter().map(|s| s.to_string()).collect()
}
fn default_per_source() -> usize {
    6
}
fn default_top_k() -> usize {
    10
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    /// Items taken from each feed per cycle.
    #[serde(default = "default_per_source")]
    pub per_source: usize,
    /// Cards shown after ranking/filtering.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            per_source: default_per_source(),
            top_k: default_top_k(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// HTTP client timeout per feed request; `None` leaves it to the source.
    #[serde(default)]
    pub fetch_timeout_secs: Option<u64>,
    #[serde(default = "default_feeds")]
    pub feeds: Vec<String>,
    #[serde(default)]
    pub defaults: Defaults,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
            bind_addr: default_bind_addr(),
            fetch_timeout_secs: None,
            feeds: default_feeds(),
            defaults: Defaults::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: AppConfig = toml::from_str(s).context("parsing insight config toml")?;
        cfg.feeds = clean_feeds(cfg.feeds);
        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load using env var + fallbacks, then apply env overrides:
    /// 1) $INSIGHT_CONFIG_PATH (must exist)
    /// 2) config/insight.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from_file(&pb)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::load_from_file(DEFAULT_CONFIG_PATH)?
        } else {
            Self::default()
        };

        if let Ok(p) = env::var(ENV_HISTORY_PATH) {
            if !p.trim().is_empty() {
                cfg.history_path = PathBuf::from(p.trim());
            }
        }
        if let Ok(a) = env::var(ENV_BIND_ADDR) {
            if !a.trim().is_empty() {
                cfg.bind_addr = a.trim().to_string();
            }
        }
        Ok(cfg)
    }
}

/// Trim, drop blanks, drop repeats (first occurrence wins).
fn clean_feeds(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && !out.iter().any(|o| o == t) {
            out.push(t.to_string());
        }
    }
    out
}
