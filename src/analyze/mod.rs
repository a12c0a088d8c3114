// src/analyze/mod.rs
//! Classification of scored items into insight cards.

pub mod card;
pub mod classify;

// Re-export convenient types.
pub use crate::analyze::card::{clean_summary, InsightCard, SUMMARY_MAX_CHARS};
pub use crate::analyze::classify::{
    classify, join_tags, triggers, Classification, Conviction, Label, TriggerTag, TRIGGER_RULES,
};
