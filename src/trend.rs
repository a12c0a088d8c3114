//! # Hourly trend
//! Rolls history records up into per-hour (UTC) mean score and count.
//!
//! Hours without records are absent from both series; interpolation is the
//! display's business.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::history::HistoryRecord;

/// The trailing window the trend view covers.
pub fn default_window() -> Duration {
    Duration::hours(24)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourPoint<T> {
    pub hour: DateTime<Utc>,
    pub value: T,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HourlyTrend {
    /// Mean score per hour, ascending by hour.
    pub avg_score: Vec<HourPoint<f64>>,
    /// Record count per hour, ascending by hour.
    pub count: Vec<HourPoint<usize>>,
}

impl HourlyTrend {
    pub fn is_empty(&self) -> bool {
        self.count.is_empty()
    }
}

/// Start of the UTC hour containing `ts`.
pub fn floor_to_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    let secs = ts.timestamp();
    let floored = secs - secs.rem_euclid(3600);
    DateTime::<Utc>::from_timestamp(floored, 0).unwrap_or(ts)
}

pub fn hourly_trend(records: &[HistoryRecord]) -> HourlyTrend {
    // hour -> (sum, n)
    let mut buckets: BTreeMap<DateTime<Utc>, (f64, usize)> = BTreeMap::new();
    for r in records {
        let b = buckets.entry(floor_to_hour(r.logged_at)).or_insert((0.0, 0));
        b.0 += r.score;
        b.1 += 1;
    }

    let mut trend = HourlyTrend::default();
    for (hour, (sum, n)) in buckets {
        trend.avg_score.push(HourPoint {
            hour,
            value: sum / n as f64,
        });
        trend.count.push(HourPoint { hour, value: n });
    }
    trend
}
