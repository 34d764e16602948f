//! Point-in-time sampling over time-stamped series
//!
//! Two rules are used when fusing the feeds:
//! - observations take the value of the latest entry that has already started;
//! - forecast periods take the first half-open `[start, end)` span holding now.

use chrono::{DateTime, Utc};

/// A measurement that becomes effective at some instant
pub trait Effective {
    type Value: Copy;

    fn starts_at(&self) -> DateTime<Utc>;

    /// `None` when the upstream reported a null value
    fn value(&self) -> Option<Self::Value>;
}

/// A half-open `[start, end)` interval
pub trait Span {
    fn start(&self) -> DateTime<Utc>;
    fn end(&self) -> DateTime<Utc>;

    fn contains(&self, now: DateTime<Utc>) -> bool {
        self.start() <= now && now < self.end()
    }
}

/// Value of the last entry, in sequence order, whose start is at or before `now`.
///
/// Entries are visited first to last exactly as received and every started
/// entry overwrites the running answer, including with a null value.
/// Entries that start after `now` are skipped. Returns `None` when nothing has
/// started yet.
pub fn sample_latest_effective<M: Effective>(
    series: &[M],
    now: DateTime<Utc>,
) -> Option<M::Value> {
    let mut latest = None;
    for measurement in series {
        if measurement.starts_at() <= now {
            latest = measurement.value();
        }
    }
    latest
}

/// First period whose `[start, end)` contains `now`
pub fn sample_containing<S: Span>(periods: &[S], now: DateTime<Utc>) -> Option<&S> {
    periods.iter().find(|period| period.contains(now))
}
