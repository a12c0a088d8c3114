//! history.rs — append-only log of generated insight cards.
//!
//! Every generated batch is projected into [`HistoryRecord`]s sharing one UTC
//! stamp. Stores only ever add rows; the trend view reads them back through
//! [`HistoryStore::query_since`].
//!
//! Appends take `&mut self`: callers that share a store (the HTTP server) must
//! serialize access themselves.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::analyze::{join_tags, Conviction, InsightCard, Label, TriggerTag};

/// Separator between trigger names in the persisted `triggers` column.
pub const TRIGGER_DELIMITER: &str = " | ";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub logged_at: DateTime<Utc>,
    pub headline: String,
    pub source: String,
    pub score: f64,
    pub label: Label,
    pub conviction: Conviction,
    pub triggers: BTreeSet<TriggerTag>,
    pub link: String,
}

impl HistoryRecord {
    pub fn from_card(card: &InsightCard, logged_at: DateTime<Utc>) -> Self {
        Self {
            logged_at,
            headline: card.headline().to_string(),
            source: card.source().to_string(),
            score: card.score(),
            label: card.label(),
            conviction: card.conviction(),
            triggers: card.triggers().clone(),
            link: card.link().to_string(),
        }
    }
}

pub trait HistoryStore: Send {
    /// Append one record per card, all stamped with the same time derived from `now`.
    /// An empty batch writes nothing. Returns the records written.
    fn append_at(&mut self, cards: &[InsightCard], now: DateTime<Utc>)
        -> Result<Vec<HistoryRecord>>;

    /// Records with `logged_at >= now - window`, in stored order.
    fn query_since_at(&self, window: Duration, now: DateTime<Utc>) -> Result<Vec<HistoryRecord>>;

    fn append(&mut self, cards: &[InsightCard]) -> Result<Vec<HistoryRecord>> {
        self.append_at(cards, Utc::now())
    }

    fn query_since(&self, window: Duration) -> Result<Vec<HistoryRecord>> {
        self.query_since_at(window, Utc::now())
    }
}

/// Batch stamp: `now` at microsecond precision (what the log can represent),
/// never earlier than the previous stamp of the same store.
fn next_stamp(last: &mut Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    let now = now.trunc_subsecs(6);
    let stamp = last.map_or(now, |prev| prev.max(now));
    *last = Some(stamp);
    stamp
}

fn project(cards: &[InsightCard], stamp: DateTime<Utc>) -> Vec<HistoryRecord> {
    cards
        .iter()
        .map(|c| HistoryRecord::from_card(c, stamp))
        .collect()
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    rows: Vec<HistoryRecord>,
    last_logged_at: Option<DateTime<Utc>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn append_at(
        &mut self,
        cards: &[InsightCard],
        now: DateTime<Utc>,
    ) -> Result<Vec<HistoryRecord>> {
        if cards.is_empty() {
            return Ok(Vec::new());
        }
        let stamp = next_stamp(&mut self.last_logged_at, now);
        let records = project(cards, stamp);
        self.rows.extend(records.iter().cloned());
        counter!("history_rows_appended_total").increment(records.len() as u64);
        Ok(records)
    }

    fn query_since_at(&self, window: Duration, now: DateTime<Utc>) -> Result<Vec<HistoryRecord>> {
        let cutoff = now - window;
        Ok(self
            .rows
            .iter()
            .filter(|r| r.logged_at >= cutoff)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// CSV file
// ---------------------------------------------------------------------------

/// On-disk row shape. Column order is the file's header order.
#[derive(Debug, Serialize, Deserialize)]
struct HistoryRow {
    logged_at: String,
    headline: String,
    source: String,
    score: f64,
    label: Label,
    conviction: Conviction,
    triggers: String,
    link: String,
}

impl From<&HistoryRecord> for HistoryRow {
    fn from(r: &HistoryRecord) -> Self {
        Self {
            logged_at: r.logged_at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
            headline: r.headline.clone(),
            source: r.source.clone(),
            score: r.score,
            label: r.label,
            conviction: r.conviction,
            triggers: join_tags(&r.triggers, TRIGGER_DELIMITER),
            link: r.link.clone(),
        }
    }
}

impl TryFrom<HistoryRow> for HistoryRecord {
    type Error = anyhow::Error;

    fn try_from(row: HistoryRow) -> Result<Self> {
        let logged_at = DateTime::parse_from_rfc3339(row.logged_at.trim())
            .with_context(|| format!("unparseable logged_at {:?}", row.logged_at))?
            .with_timezone(&Utc);
        let triggers = parse_triggers(&row.triggers);
        Ok(Self {
            logged_at,
            headline: row.headline,
            source: row.source,
            score: row.score,
            label: row.label,
            conviction: row.conviction,
            triggers,
            link: row.link,
        })
    }
}

/// Unknown names are skipped with a warning; the rest of the row still counts.
fn parse_triggers(s: &str) -> BTreeSet<TriggerTag> {
    s.split(TRIGGER_DELIMITER.trim())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .filter_map(|t| match t.parse::<TriggerTag>() {
            Ok(tag) => Some(tag),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unknown trigger in history row");
                counter!("history_unknown_triggers_total").increment(1);
                None
            }
        })
        .collect()
}

/// True when the file has content whose last byte is not `\n`, i.e. an
/// earlier write was cut short or the file was edited by hand.
fn missing_final_newline(file: &mut File) -> Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// Delimited-file log with header
/// `logged_at,headline,source,score,label,conviction,triggers,link`.
/// New rows are appended to the end of the file; existing rows are never rewritten.
#[derive(Debug)]
pub struct CsvHistoryStore {
    path: PathBuf,
    last_logged_at: Option<DateTime<Utc>>,
}

impl CsvHistoryStore {
    /// Open (or lazily create) the log at `path`. Existing rows seed the
    /// monotonic stamp so a restarted process never stamps earlier.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let last_logged_at = read_records(&path)?.iter().map(|r| r.logged_at).max();
        Ok(Self {
            path,
            last_logged_at,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every readable row in file order.
    pub fn load_all(&self) -> Result<Vec<HistoryRecord>> {
        read_records(&self.path)
    }
}

impl HistoryStore for CsvHistoryStore {
    fn append_at(
        &mut self,
        cards: &[InsightCard],
        now: DateTime<Utc>,
    ) -> Result<Vec<HistoryRecord>> {
        if cards.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating history dir {}", dir.display()))?;
        }
        let mut file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening history log {}", self.path.display()))?;
        let write_header = file
            .metadata()
            .with_context(|| format!("stat {}", self.path.display()))?
            .len()
            == 0;
        // Append mode always writes at the end, whatever the read position.
        if missing_final_newline(&mut file)
            .with_context(|| format!("checking tail of {}", self.path.display()))?
        {
            file.write_all(b"\n")
                .with_context(|| format!("terminating last row of {}", self.path.display()))?;
        }

        let stamp = next_stamp(&mut self.last_logged_at, now);
        let records = project(cards, stamp);

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        for r in &records {
            wtr.serialize(HistoryRow::from(r))
                .with_context(|| format!("writing history row to {}", self.path.display()))?;
        }
        wtr.flush()
            .with_context(|| format!("flushing history log {}", self.path.display()))?;

        counter!("history_rows_appended_total").increment(records.len() as u64);
        tracing::debug!(path = %self.path.display(), rows = records.len(), "history appended");
        Ok(records)
    }

    fn query_since_at(&self, window: Duration, now: DateTime<Utc>) -> Result<Vec<HistoryRecord>> {
        let cutoff = now - window;
        let mut rows = read_records(&self.path)?;
        rows.retain(|r| r.logged_at >= cutoff);
        Ok(rows)
    }
}

/// Read the whole log. A missing file is an empty history; bad rows are dropped.
fn read_records(path: &Path) -> Result<Vec<HistoryRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening history log {}", path.display()))?;

    let mut out = Vec::new();
    for (idx, row) in rdr.deserialize::<HistoryRow>().enumerate() {
        let parsed = row
            .map_err(anyhow::Error::from)
            .and_then(HistoryRecord::try_from);
        match parsed {
            Ok(r) => out.push(r),
            Err(e) => {
                // idx is 0-based over data rows; +2 accounts for the header line.
                tracing::warn!(error = %e, line = idx + 2, path = %path.display(), "dropping history row");
                counter!("history_rows_dropped_total").increment(1);
            }
        }
    }
    Ok(out)
}
