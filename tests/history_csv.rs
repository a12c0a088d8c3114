// tests/history_csv.rs
use std::fs;

use asset_insight::history::{CsvHistoryStore, HistoryStore};
use asset_insight::ingest::types::RawItem;
use asset_insight::{Conviction, InsightCard, Label, TriggerTag};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn card(title: &str, summary: &str, score: f64) -> InsightCard {
    InsightCard::from_raw(
        &RawItem {
            source: "Crypto Wire".into(),
            title: title.into(),
            summary: summary.into(),
            link: format!("https://cryptowire.test/{}", title.to_lowercase().replace(' ', "-")),
            published: None,
        },
        score,
    )
}

fn at(h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 14, h, 0, 0).unwrap()
}

#[test]
fn missing_file_is_empty_history() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvHistoryStore::open(dir.path().join("history.csv")).unwrap();
    assert!(store.query_since(Duration::hours(24)).unwrap().is_empty());
    assert!(!store.path().exists(), "reading must not create the log");
}

#[test]
fn round_trip_preserves_record_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("output").join("history.csv");
    let mut store = CsvHistoryStore::open(&path).unwrap();

    let batch = vec![
        card("SEC sues exchange amid hack fears", "", -0.65),
        card("Quiet trading day", "", 0.05),
        card("Headline, with \"quotes\" and commas", "", 0.3333333333333333),
    ];
    let written = store.append_at(&batch, at(12)).unwrap();
    assert_eq!(written.len(), 3);
    assert!(path.exists(), "parent dirs and file are created on first append");

    let read = store.query_since_at(Duration::hours(24), at(13)).unwrap();
    assert_eq!(read, written);

    assert_eq!(read[0].label, Label::Negative);
    assert_eq!(read[0].conviction, Conviction::High);
    assert_eq!(
        read[0].triggers.iter().copied().collect::<Vec<_>>(),
        vec![
            TriggerTag::ExchangeSecurity,
            TriggerTag::HighVolatility,
            TriggerTag::Regulatory
        ]
    );
    assert!(read[1].triggers.is_empty());
    assert_eq!(read[2].headline, "Headline, with \"quotes\" and commas");
    assert_eq!(read[2].score, 0.3333333333333333);
    assert!(read.iter().all(|r| r.logged_at == at(12)));
}

#[test]
fn file_layout_uses_header_once_and_pipe_delimited_triggers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.csv");
    let mut store = CsvHistoryStore::open(&path).unwrap();

    store
        .append_at(&[card("SEC sues exchange amid hack fears", "", -0.65)], at(9))
        .unwrap();
    let after_first = fs::read_to_string(&path).unwrap();
    store
        .append_at(&[card("Quiet trading day", "", 0.05)], at(10))
        .unwrap();
    let after_second = fs::read_to_string(&path).unwrap();

    let mut lines = after_second.lines();
    assert_eq!(
        lines.next(),
        Some("logged_at,headline,source,score,label,conviction,triggers,link")
    );
    assert_eq!(after_second.matches("logged_at,headline").count(), 1);
    assert!(after_second.starts_with(&after_first), "prior rows are never rewritten");
    assert!(after_first.contains("Exchange / Security | High Volatility | Regulatory"));
    assert!(after_first.contains("2026-10-14T09:00:00.000000Z"));
    assert_eq!(after_second.lines().count(), 3);
}

#[test]
fn query_window_excludes_older_rows() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = CsvHistoryStore::open(dir.path().join("history.csv")).unwrap();
    store.append_at(&[card("old", "", 0.1)], at(0)).unwrap();
    store.append_at(&[card("new", "", 0.2)], at(20)).unwrap();

    let rows = store.query_since_at(Duration::hours(3), at(22)).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].headline, "new");
}

#[test]
fn unparseable_rows_are_dropped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.csv");
    fs::write(
        &path,
        "logged_at,headline,source,score,label,conviction,triggers,link\n\
         not-a-date,Bad stamp,Wire,0.1,neutral,low,,https://x.test/1\n\
         2026-10-14T08:15:00.123456+00:00,Written by an older run,Wire,0.7,positive,high,High Volatility,https://x.test/2\n\
         2026-10-14T08:20:00Z,Bad score,Wire,abc,neutral,low,,https://x.test/3\n\
         2026-10-14T08:25:00Z,Odd tag,Wire,0.0,neutral,low,Weather | Macro,https://x.test/4\n",
    )
    .unwrap();

    let store = CsvHistoryStore::open(&path).unwrap();
    let rows = store.load_all().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].headline, "Written by an older run");
    assert_eq!(rows[0].triggers.len(), 1);
    // Unknown tag names are skipped; the row itself still feeds the trend.
    assert_eq!(rows[1].headline, "Odd tag");
    assert_eq!(
        rows[1].triggers.iter().copied().collect::<Vec<_>>(),
        vec![TriggerTag::Macro]
    );
}

#[test]
fn append_after_unterminated_last_row_starts_a_new_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.csv");
    let existing = "logged_at,headline,source,score,label,conviction,triggers,link\n\
                    2026-10-14T08:15:00+00:00,Old,W,0.1,neutral,low,,https://x.test/1";
    fs::write(&path, existing).unwrap();

    let mut store = CsvHistoryStore::open(&path).unwrap();
    store.append_at(&[card("New", "", 0.5)], at(9)).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with(existing), "prior rows are never rewritten");
    assert_eq!(text.lines().count(), 3);

    let rows = store.query_since_at(Duration::hours(24), at(10)).unwrap();
    let headlines: Vec<_> = rows.iter().map(|r| r.headline.as_str()).collect();
    assert_eq!(headlines, vec!["Old", "New"]);
    assert_eq!(rows[0].link, "https://x.test/1");
}

#[test]
fn stamps_never_go_backwards_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.csv");
    {
        let mut store = CsvHistoryStore::open(&path).unwrap();
        store.append_at(&[card("first", "", 0.0)], at(15)).unwrap();
    }
    let mut reopened = CsvHistoryStore::open(&path).unwrap();
    let written = reopened.append_at(&[card("second", "", 0.0)], at(14)).unwrap();
    assert_eq!(written[0].logged_at, at(15));

    let all = reopened.load_all().unwrap();
    assert!(all.windows(2).all(|w| w[0].logged_at <= w[1].logged_at));
}

#[test]
fn empty_batch_does_not_create_the_log() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = CsvHistoryStore::open(dir.path().join("history.csv")).unwrap();
    assert!(store.append_at(&[], at(1)).unwrap().is_empty());
    assert!(!store.path().exists());
}

#[test]
fn unwritable_location_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the parent directory should be.
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "x").unwrap();
    let mut store = CsvHistoryStore::open(blocker.join("history.csv")).unwrap();
    assert!(store.append_at(&[card("x", "", 0.0)], at(1)).is_err());
}
