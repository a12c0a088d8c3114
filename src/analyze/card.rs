//! Insight cards: one scored, classified news item ready for display.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::analyze::classify::{classify, Conviction, Label, TriggerTag};
use crate::ingest::types::RawItem;
use crate::sentiment::clamp_score;

/// Display cap for summaries, in characters (before the ellipsis).
pub const SUMMARY_MAX_CHARS: usize = 350;

/// Derived view of a [`RawItem`]. Label, conviction and triggers are computed
/// from the score at construction and cannot be set any other way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightCard {
    headline: String,
    source: String,
    published: Option<String>,
    link: String,
    score: f64,
    label: Label,
    conviction: Conviction,
    triggers: BTreeSet<TriggerTag>,
    summary: String,
}

impl InsightCard {
    /// Build a card from an item and its sentiment score (clamped to [-1, 1]).
    pub fn from_raw(item: &RawItem, score: f64) -> Self {
        let score = clamp_score(score);
        let c = classify(&item.scoring_text(), score);
        Self {
            headline: item.title.clone(),
            source: item.source.clone(),
            published: item.published.clone(),
            link: item.link.clone(),
            score,
            label: c.label,
            conviction: c.conviction,
            triggers: c.triggers,
            summary: clean_summary(&item.summary),
        }
    }

    pub fn headline(&self) -> &str {
        &self.headline
    }
    pub fn source(&self) -> &str {
        &self.source
    }
    pub fn published(&self) -> Option<&str> {
        self.published.as_deref()
    }
    pub fn link(&self) -> &str {
        &self.link
    }
    pub fn score(&self) -> f64 {
        self.score
    }
    pub fn label(&self) -> Label {
        self.label
    }
    pub fn conviction(&self) -> Conviction {
        self.conviction
    }
    pub fn triggers(&self) -> &BTreeSet<TriggerTag> {
        &self.triggers
    }
    pub fn summary(&self) -> &str {
        &self.summary
    }
}

/// Strip `<p>`/`</p>`, trim, and cap at [`SUMMARY_MAX_CHARS`] on a word boundary
/// followed by `...`.
pub fn clean_summary(raw: &str) -> String {
    let summary = raw.replace("<p>", "").replace("</p>", "");
    let summary = summary.trim();
    if summary.chars().count() <= SUMMARY_MAX_CHARS {
        return summary.to_string();
    }

    let head: String = summary.chars().take(SUMMARY_MAX_CHARS).collect();
    let cut = match head.rfind(' ') {
        Some(idx) => &head[..idx],
        None => head.as_str(),
    };
    format!("{cut}...")
}
