//! Score → label/conviction buckets and keyword trigger tags.
//!
//! Everything here is pure: the same `(text, score)` always yields the same
//! [`Classification`]. Trigger rules are a static table ([`TRIGGER_RULES`]),
//! matched case-insensitively as plain substrings of the text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// score >= this → positive.
pub const POSITIVE_THRESHOLD: f64 = 0.2;
/// score <= this → negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.2;
/// |score| >= this → high conviction (and the volatility tag).
pub const HIGH_CONVICTION: f64 = 0.6;
/// |score| >= this → at least medium conviction.
pub const MEDIUM_CONVICTION: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Positive,
    Negative,
    Neutral,
}

impl Label {
    pub fn from_score(score: f64) -> Self {
        if score >= POSITIVE_THRESHOLD {
            Label::Positive
        } else if score <= NEGATIVE_THRESHOLD {
            Label::Negative
        } else {
            Label::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Positive => "positive",
            Label::Negative => "negative",
            Label::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conviction {
    Low,
    Medium,
    High,
}

impl Conviction {
    pub fn from_score(score: f64) -> Self {
        let m = score.abs();
        if m >= HIGH_CONVICTION {
            Conviction::High
        } else if m >= MEDIUM_CONVICTION {
            Conviction::Medium
        } else {
            Conviction::Low
        }
    }

    /// Sort weight: high=3, medium=2, low=1.
    pub fn rank(&self) -> u8 {
        match self {
            Conviction::High => 3,
            Conviction::Medium => 2,
            Conviction::Low => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Conviction::Low => "low",
            Conviction::Medium => "medium",
            Conviction::High => "high",
        }
    }
}

/// Trigger categories. Variant order matches the lexicographic order of the
/// display names, so a `BTreeSet<TriggerTag>` iterates sorted by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TriggerTag {
    #[serde(rename = "Adoption / Institutional")]
    AdoptionInstitutional,
    #[serde(rename = "Exchange / Security")]
    ExchangeSecurity,
    #[serde(rename = "High Volatility")]
    HighVolatility,
    #[serde(rename = "Macro")]
    Macro,
    #[serde(rename = "Regulatory")]
    Regulatory,
}

impl TriggerTag {
    pub const ALL: [TriggerTag; 5] = [
        TriggerTag::AdoptionInstitutional,
        TriggerTag::ExchangeSecurity,
        TriggerTag::HighVolatility,
        TriggerTag::Macro,
        TriggerTag::Regulatory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerTag::AdoptionInstitutional => "Adoption / Institutional",
            TriggerTag::ExchangeSecurity => "Exchange / Security",
            TriggerTag::HighVolatility => "High Volatility",
            TriggerTag::Macro => "Macro",
            TriggerTag::Regulatory => "Regulatory",
        }
    }
}

impl fmt::Display for TriggerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerTag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TriggerTag::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| anyhow::anyhow!("unknown trigger tag: {s:?}"))
    }
}

/// Keyword table: a tag fires when any of its keywords is a substring of the
/// lower-cased text.
pub const TRIGGER_RULES: &[(TriggerTag, &[&str])] = &[
    (
        TriggerTag::Regulatory,
        &[
            "sec",
            "regulation",
            "regulatory",
            "ban",
            "lawsuit",
            "etf",
            "government",
            "court",
        ],
    ),
    (
        TriggerTag::ExchangeSecurity,
        &["hack", "breach", "exploit", "security", "attack", "phishing"],
    ),
    (
        TriggerTag::Macro,
        &[
            "fed",
            "interest rate",
            "rates",
            "inflation",
            "macro",
            "economy",
            "recession",
        ],
    ),
    (
        TriggerTag::AdoptionInstitutional,
        &[
            "adoption",
            "partnership",
            "institutional",
            "investment",
            "fund",
            "bank",
            "corporate",
        ],
    ),
];

/// Keyword tags plus [`TriggerTag::HighVolatility`] when |score| >= 0.6.
pub fn triggers(text: &str, score: f64) -> BTreeSet<TriggerTag> {
    let t = text.to_lowercase();
    let mut tags: BTreeSet<TriggerTag> = TRIGGER_RULES
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| t.contains(k)))
        .map(|(tag, _)| *tag)
        .collect();

    if score.abs() >= HIGH_CONVICTION {
        tags.insert(TriggerTag::HighVolatility);
    }
    tags
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub label: Label,
    pub conviction: Conviction,
    pub triggers: BTreeSet<TriggerTag>,
}

pub fn classify(text: &str, score: f64) -> Classification {
    Classification {
        label: Label::from_score(score),
        conviction: Conviction::from_score(score),
        triggers: triggers(text, score),
    }
}

/// Tag names joined with `sep`, in sorted order.
pub fn join_tags(tags: &BTreeSet<TriggerTag>, sep: &str) -> String {
    tags.iter().map(TriggerTag::as_str).collect::<Vec<_>>().join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_boundaries_are_inclusive() {
        assert_eq!(Label::from_score(0.2), Label::Positive);
        assert_eq!(Label::from_score(0.1999), Label::Neutral);
        assert_eq!(Label::from_score(-0.2), Label::Negative);
        assert_eq!(Label::from_score(-0.1999), Label::Neutral);
        assert_eq!(Label::from_score(0.0), Label::Neutral);
        assert_eq!(Label::from_score(1.0), Label::Positive);
        assert_eq!(Label::from_score(-1.0), Label::Negative);
    }

    #[test]
    fn conviction_boundaries_use_magnitude() {
        assert_eq!(Conviction::from_score(0.6), Conviction::High);
        assert_eq!(Conviction::from_score(-0.6), Conviction::High);
        assert_eq!(Conviction::from_score(0.5999), Conviction::Medium);
        assert_eq!(Conviction::from_score(-0.3), Conviction::Medium);
        assert_eq!(Conviction::from_score(0.2999), Conviction::Low);
        assert_eq!(Conviction::from_score(0.0), Conviction::Low);
    }

    #[test]
    fn tag_order_matches_display_names() {
        let mut names: Vec<&str> = TriggerTag::ALL.iter().map(|t| t.as_str()).collect();
        let declared = names.clone();
        names.sort();
        assert_eq!(names, declared);
    }

    #[test]
    fn tags_parse_from_display_names() {
        for t in TriggerTag::ALL {
            assert_eq!(t.as_str().parse::<TriggerTag>().unwrap(), t);
        }
        assert!("Weather".parse::<TriggerTag>().is_err());
    }

    #[test]
    fn keyword_match_is_case_insensitive_substring() {
        // "Fed" matches Macro; "FUNDS" matches "fund".
        let tags = triggers("FED watchers move FUNDS", 0.0);
        assert!(tags.contains(&TriggerTag::Macro));
        assert!(tags.contains(&TriggerTag::AdoptionInstitutional));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn substring_semantics_include_embedded_words() {
        // "second" contains "sec".
        let tags = triggers("A second look", 0.0);
        assert_eq!(
            tags.into_iter().collect::<Vec<_>>(),
            vec![TriggerTag::Regulatory]
        );
    }

    #[test]
    fn volatility_tag_follows_magnitude() {
        assert!(triggers("nothing", 0.6).contains(&TriggerTag::HighVolatility));
        assert!(triggers("nothing", -0.75).contains(&TriggerTag::HighVolatility));
        assert!(triggers("nothing", 0.59).is_empty());
    }

    #[test]
    fn join_is_sorted() {
        let tags = triggers("SEC sues exchange amid hack fears", -0.65);
        assert_eq!(
            join_tags(&tags, " | "),
            "Exchange / Security | High Volatility | Regulatory"
        );
    }
}
