//! Raw and normalized burndown history.
//!
//! Raw history is what the data source recorded: irregular, time-stamped
//! samples of one quantity for one release. Normalized history is the
//! one-value-per-calendar-day series the forecasting math runs on.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{ReleaseId, TrackedQuantity};

/// One recorded sample of a tracked quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl HistoryEntry {
    /// The calendar day this sample describes.
    ///
    /// Samples are recorded at the start of a day and describe the state as
    /// of the end of the previous day.
    #[must_use]
    pub fn effective_date(&self) -> NaiveDate {
        let recorded = self.timestamp.date_naive();
        recorded.pred_opt().unwrap_or(recorded)
    }
}

/// Raw history of one quantity for one release, ordered by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawBurndownHistory {
    release: ReleaseId,
    quantity: TrackedQuantity,
    entries: Vec<HistoryEntry>,
    last_time_entry: Option<DateTime<Utc>>,
}

impl RawBurndownHistory {
    /// Build a history, ordering entries non-decreasing by timestamp.
    ///
    /// The sort is stable so same-timestamp samples keep their recorded order
    /// and the last one stays authoritative.
    #[must_use]
    pub fn new(
        release: ReleaseId,
        quantity: TrackedQuantity,
        mut entries: Vec<HistoryEntry>,
    ) -> Self {
        entries.sort_by_key(|e| e.timestamp);
        let last_time_entry = entries.last().map(|e| e.timestamp);
        Self {
            release,
            quantity,
            entries,
            last_time_entry,
        }
    }

    #[must_use]
    pub const fn release(&self) -> &ReleaseId {
        &self.release
    }

    #[must_use]
    pub const fn quantity(&self) -> TrackedQuantity {
        self.quantity
    }

    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Timestamp of the most recent sample; the cache validity token.
    #[must_use]
    pub const fn last_time_entry(&self) -> Option<DateTime<Utc>> {
        self.last_time_entry
    }

    /// Whether this history belongs to a strictly newer data generation.
    #[must_use]
    pub fn is_newer_than(&self, other: &Self) -> bool {
        match (self.last_time_entry, other.last_time_entry) {
            (Some(mine), Some(theirs)) => mine > theirs,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Samples keyed by effective date, one per day (last sample wins).
    #[must_use]
    pub fn effective_points(&self) -> Vec<(NaiveDate, f64)> {
        let mut points: Vec<(NaiveDate, f64)> = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let day = entry.effective_date();
            match points.last_mut() {
                Some((last_day, value)) if *last_day == day => *value = entry.value,
                _ => points.push((day, entry.value)),
            }
        }
        points
    }
}

/// One value per calendar day over `[start, end]`.
///
/// `values[i]` is the value on `start + i`; the series is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBurndownHistory {
    start: NaiveDate,
    values: Vec<f64>,
}

impl NormalizedBurndownHistory {
    /// Wrap a daily series. Returns `None` for an empty series.
    #[must_use]
    pub fn new(start: NaiveDate, values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self { start, values })
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day covered by the series.
    #[must_use]
    pub fn end(&self) -> NaiveDate {
        let offset = u64::try_from(self.values.len() - 1).unwrap_or(u64::MAX);
        self.start
            .checked_add_days(Days::new(offset))
            .unwrap_or(NaiveDate::MAX)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value on `day`, or `None` outside `[start, end]`.
    #[must_use]
    pub fn value_on(&self, day: NaiveDate) -> Option<f64> {
        let offset = usize::try_from((day - self.start).num_days()).ok()?;
        self.values.get(offset).copied()
    }

    /// Value on the last day of the series.
    #[must_use]
    pub fn last_value(&self) -> f64 {
        self.values.last().copied().unwrap_or_default()
    }

    /// Overwrite the value on the last day.
    pub fn set_last_value(&mut self, value: f64) {
        if let Some(last) = self.values.last_mut() {
            *last = value;
        }
    }

    /// Iterate `(day, value)` pairs in calendar order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.start
            .iter_days()
            .zip(self.values.iter().copied())
    }
}
