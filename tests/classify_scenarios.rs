// tests/classify_scenarios.rs
use asset_insight::analyze::{classify, clean_summary, Conviction, Label, TriggerTag};

#[test]
fn sec_hack_headline_is_negative_high_with_three_tags() {
    let c = classify("SEC sues exchange amid hack fears", -0.65);
    assert_eq!(c.label, Label::Negative);
    assert_eq!(c.conviction, Conviction::High);
    let names: Vec<_> = c.triggers.iter().map(|t| t.as_str()).collect();
    assert_eq!(
        names,
        vec!["Exchange / Security", "High Volatility", "Regulatory"]
    );
}

#[test]
fn quiet_day_is_neutral_low_without_tags() {
    let c = classify("Quiet trading day", 0.05);
    assert_eq!(c.label, Label::Neutral);
    assert_eq!(c.conviction, Conviction::Low);
    assert!(c.triggers.is_empty());
}

#[test]
fn classification_is_idempotent() {
    let text = "Fed rate path and ETF flows in focus as bank partnership lands";
    for score in [-1.0, -0.6, -0.2, 0.0, 0.19, 0.3, 0.61, 1.0] {
        assert_eq!(classify(text, score), classify(text, score));
    }
}

#[test]
fn every_keyword_set_can_fire_alone() {
    let cases = [
        ("court date set", TriggerTag::Regulatory),
        ("phishing wave", TriggerTag::ExchangeSecurity),
        ("interest rate path", TriggerTag::Macro),
        ("corporate treasury", TriggerTag::AdoptionInstitutional),
    ];
    for (text, tag) in cases {
        let c = classify(text, 0.0);
        assert_eq!(c.triggers.len(), 1, "{text}: {:?}", c.triggers);
        assert!(c.triggers.contains(&tag), "{text}");
    }
}

#[test]
fn long_summary_is_cut_at_a_word_boundary() {
    let summary = format!("<p>{}</p>", "Bitcoin traders weigh macro signals. ".repeat(20));
    let out = clean_summary(&summary);
    assert!(out.ends_with("..."));
    let body = &out[..out.len() - 3];
    assert!(body.chars().count() <= 350);
    assert!(!body.contains("<p>"));
    // The cut lands on a whole word of the original text.
    let last_word = body.rsplit(' ').next().unwrap();
    assert!(["Bitcoin", "traders", "weigh", "macro", "signals."].contains(&last_word));
}
