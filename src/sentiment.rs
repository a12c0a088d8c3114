//! Sentiment scoring boundary.
//!
//! The pipeline only needs `text -> f64` in [-1, 1]. [`LexiconScorer`] is the
//! bundled implementation; anything else (a model server, a different lexicon)
//! plugs in through [`SentimentScorer`].

use once_cell::sync::Lazy;
use std::collections::HashMap;

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// Normalization constant for the compound score: `sum / sqrt(sum^2 + ALPHA)`.
const ALPHA: f64 = 15.0;

pub trait SentimentScorer: Send + Sync {
    /// Score `text` in [-1, 1], higher is more positive. Empty text scores 0.0.
    fn score(&self, text: &str) -> f64;
}

/// Bring any scorer output into the documented range. NaN counts as neutral.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(-1.0, 1.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }

    /// Lexicon valence for a lower-cased token (0 when unknown).
    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Returns (raw valence sum, token count).
    /// Negation: a negator within the previous 1..=3 tokens flips the sign of a word.
    pub fn raw_score(&self, text: &str) -> (i32, usize) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;

        for i in 0..tokens.len() {
            let base = self.word_score(tokens[i].as_str());
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            score += if negated { -base } else { base };
        }

        (score, tokens.len())
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> f64 {
        let (sum, _) = self.raw_score(text);
        if sum == 0 {
            return 0.0;
        }
        let s = f64::from(sum);
        clamp_score(s / (s * s + ALPHA).sqrt())
    }
}

/// Lower-cased alphanumeric tokens; apostrophes stay inside words ("isn't").
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "without"
            | "don't"
            | "doesn't"
            | "didn't"
    )
}
