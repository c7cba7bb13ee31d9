//! Gap-filling of raw history into one value per calendar day.
//!
//! Rules, for each day from the release start to today:
//!
//! - today: the live remaining value, regardless of recorded history
//! - a day with a recorded sample: that sample (last one of the day wins)
//! - before the first sample: placeholder, pruned from the front afterwards
//! - between two samples on a working day: linear by elapsed calendar days
//! - between two samples on a non-working day: the previous day's value
//! - after the last sample: the last sample's value
//!
//! Samples are placed on their effective date, the day before they were
//! recorded.

use burnrate_core::calendar::WorkingCalendar;
use burnrate_core::model::{NormalizedBurndownHistory, RawBurndownHistory, Release};
use chrono::NaiveDate;

/// Normalize `raw` for `release` as of `today`.
///
/// Returns `None` when the release has no contributing sprint, starts after
/// `today`, or has no raw history.
#[must_use]
pub fn normalize(
    release: &Release,
    raw: Option<&RawBurndownHistory>,
    current_remaining: f64,
    today: NaiveDate,
    calendar: &(impl WorkingCalendar + ?Sized),
) -> Option<NormalizedBurndownHistory> {
    let start = release.start_date()?;
    let raw = raw?;
    normalize_series(
        start,
        today,
        &raw.effective_points(),
        current_remaining,
        calendar,
    )
}

/// Build the daily series over `[start, today]` from dated samples.
///
/// `points` must be sorted by date with at most one sample per date, as
/// produced by [`RawBurndownHistory::effective_points`]. The leading run of
/// days before the first sample is pruned, so the returned series starts on
/// the first day with data and always ends on `today`.
#[must_use]
pub fn normalize_series(
    start: NaiveDate,
    today: NaiveDate,
    points: &[(NaiveDate, f64)],
    current_remaining: f64,
    calendar: &(impl WorkingCalendar + ?Sized),
) -> Option<NormalizedBurndownHistory> {
    if start > today {
        return None;
    }

    // Index of the first sample dated on or after the day being filled.
    let mut next = points.partition_point(|(d, _)| *d < start);
    let mut filled: Vec<Option<f64>> = Vec::new();

    for day in start.iter_days().take_while(|d| *d <= today) {
        while next < points.len() && points[next].0 < day {
            next += 1;
        }

        let value = if day == today {
            Some(current_remaining)
        } else {
            let before = next.checked_sub(1).map(|i| points[i]);
            match (before, points.get(next).copied()) {
                (_, Some((d, v))) if d == day => Some(v),
                (None, _) => None,
                (Some((_, v)), None) => Some(v),
                (Some(prev), Some(upcoming)) => Some(between(
                    prev,
                    upcoming,
                    day,
                    filled.last().copied().flatten(),
                    calendar,
                )),
            }
        };
        filled.push(value);
    }

    let first_real = filled.iter().position(Option::is_some)?;
    let offset = u64::try_from(first_real).ok()?;
    let pruned_start = start.checked_add_days(chrono::Days::new(offset))?;
    let values = filled.into_iter().skip(first_real).flatten().collect();
    NormalizedBurndownHistory::new(pruned_start, values)
}

/// Value of `day`, strictly between samples `prev` and `upcoming`.
///
/// `yesterday` is the value already filled for the previous day, if that day
/// is inside the series.
fn between(
    prev: (NaiveDate, f64),
    upcoming: (NaiveDate, f64),
    day: NaiveDate,
    yesterday: Option<f64>,
    calendar: &(impl WorkingCalendar + ?Sized),
) -> f64 {
    if calendar.is_working_day(day) {
        return interpolate(prev, upcoming, day);
    }
    if let Some(value) = yesterday {
        return value;
    }

    // First day of the series falls on a non-working day: carry the value of
    // the closest earlier working day, or the sample itself.
    let mut back = day;
    while let Some(earlier) = back.pred_opt() {
        if earlier <= prev.0 {
            break;
        }
        if calendar.is_working_day(earlier) {
            return interpolate(prev, upcoming, earlier);
        }
        back = earlier;
    }
    prev.1
}

#[allow(clippy::cast_precision_loss)]
fn interpolate(prev: (NaiveDate, f64), upcoming: (NaiveDate, f64), day: NaiveDate) -> f64 {
    let (d1, v1) = prev;
    let (d2, v2) = upcoming;
    let span = (d2 - d1).num_days() as f64;
    let elapsed = (day - d1).num_days() as f64;
    v1 + (v2 - v1) * elapsed / span
}
