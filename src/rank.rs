//! # Ranking & view selection
//! Orders a generated batch by conviction then magnitude and selects the
//! displayed subset. Nothing here mutates the caller's batch beyond the
//! in-place sort in [`rank_cards`].

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::analyze::{Conviction, InsightCard, TriggerTag};

/// Tags that make a card high-impact on their own. Adoption alone does not.
pub const IMPACT_TRIGGERS: [TriggerTag; 4] = [
    TriggerTag::HighVolatility,
    TriggerTag::Regulatory,
    TriggerTag::ExchangeSecurity,
    TriggerTag::Macro,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    All,
    HighImpact,
}

pub fn is_high_impact(card: &InsightCard) -> bool {
    card.conviction() == Conviction::High
        || IMPACT_TRIGGERS.iter().any(|t| card.triggers().contains(t))
}

/// Descending by (conviction rank, |score|).
fn by_conviction_then_magnitude(a: &InsightCard, b: &InsightCard) -> Ordering {
    b.conviction()
        .rank()
        .cmp(&a.conviction().rank())
        .then_with(|| b.score().abs().total_cmp(&a.score().abs()))
}

/// Stable sort: equal keys keep their prior relative order.
pub fn rank_cards(cards: &mut [InsightCard]) {
    cards.sort_by(by_conviction_then_magnitude);
}

/// Apply the view filter, then cap at `top_k`.
pub fn select_view(cards: &[InsightCard], view: ViewMode, top_k: usize) -> Vec<InsightCard> {
    cards
        .iter()
        .filter(|c| match view {
            ViewMode::All => true,
            ViewMode::HighImpact => is_high_impact(c),
        })
        .take(top_k)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::RawItem;

    fn card(title: &str, score: f64) -> InsightCard {
        InsightCard::from_raw(
            &RawItem {
                source: "Wire".into(),
                title: title.into(),
                summary: String::new(),
                link: format!("https://x.test/{title}"),
                published: None,
            },
            score,
        )
    }

    #[test]
    fn adoption_alone_is_not_high_impact() {
        assert!(!is_high_impact(&card("Corporate partnership announced", 0.1)));
        assert!(is_high_impact(&card("Corporate partnership announced", 0.7)));
        assert!(is_high_impact(&card("Inflation print", 0.1)));
        assert!(is_high_impact(&card("Phishing wave", 0.0)));
        assert!(!is_high_impact(&card("Quiet trading day", 0.4)));
    }

    #[test]
    fn ranks_by_conviction_then_magnitude() {
        let mut cards = vec![
            card("a", 0.1),
            card("b", -0.45),
            card("c", 0.62),
            card("d", 0.35),
            card("e", -0.9),
        ];
        rank_cards(&mut cards);
        let order: Vec<_> = cards.iter().map(|c| c.headline()).collect();
        assert_eq!(order, vec!["e", "c", "b", "d", "a"]);
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let mut cards = vec![card("x", 0.5), card("y", -0.5), card("z", 0.5)];
        rank_cards(&mut cards);
        let order: Vec<_> = cards.iter().map(|c| c.headline()).collect();
        assert_eq!(order, vec!["x", "y", "z"]);
    }

    #[test]
    fn view_filters_before_truncation() {
        let cards = vec![
            card("quiet one", 0.0),
            card("Fed minutes", 0.0),
            card("quiet two", 0.1),
            card("Court ruling", 0.0),
            card("Exploit drained pool", 0.0),
        ];
        let hi = select_view(&cards, ViewMode::HighImpact, 2);
        let titles: Vec<_> = hi.iter().map(|c| c.headline()).collect();
        assert_eq!(titles, vec!["Fed minutes", "Court ruling"]);

        let all = select_view(&cards, ViewMode::All, 10);
        assert_eq!(all.len(), 5);
        assert!(select_view(&cards, ViewMode::All, 0).is_empty());
    }

    #[test]
    fn view_mode_serde_names() {
        let v: ViewMode = serde_json::from_str("\"high_impact\"").unwrap();
        assert_eq!(v, ViewMode::HighImpact);
        assert_eq!(serde_json::to_string(&ViewMode::All).unwrap(), "\"all\"");
    }
}
