//! Excess at deadline, completion date and burndown projection.

use std::collections::BTreeMap;
use std::fmt;

use burnrate_core::calendar::WorkingCalendar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Upper bound on working days stepped when searching for a completion date.
pub const MAX_FORECAST_STEPS: u32 = 36_600;

/// Predicted completion of a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "date")]
pub enum CompletionForecast {
    /// Remaining work is burned down on this day.
    On(NaiveDate),
    /// No measured burn rate, or not within any reachable horizon.
    Never,
}

impl CompletionForecast {
    /// Completion day, with `Never` mapped to the largest representable date.
    #[must_use]
    pub const fn as_date(self) -> NaiveDate {
        match self {
            Self::On(date) => date,
            Self::Never => NaiveDate::MAX,
        }
    }

    #[must_use]
    pub const fn date(self) -> Option<NaiveDate> {
        match self {
            Self::On(date) => Some(date),
            Self::Never => None,
        }
    }

    #[must_use]
    pub const fn is_never(self) -> bool {
        matches!(self, Self::Never)
    }
}

impl fmt::Display for CompletionForecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On(date) => write!(f, "{date}"),
            Self::Never => f.write_str("never"),
        }
    }
}

/// Working days `d` with `today < d <= deadline`.
#[must_use]
pub fn remaining_working_days(
    today: NaiveDate,
    deadline: NaiveDate,
    calendar: &(impl WorkingCalendar + ?Sized),
) -> u32 {
    calendar.working_days_between(today, deadline)
}

/// Remaining quantity left over at the deadline at the given velocity.
///
/// Positive means behind schedule, negative ahead of it.
#[must_use]
pub fn excess(remaining: f64, remaining_working_days: u32, velocity: f64) -> f64 {
    f64::from(remaining_working_days).mul_add(-velocity, remaining)
}

/// Day the remaining work is expected to reach zero.
///
/// Behind schedule, the deadline moves forward one working day per velocity
/// unit of excess. Ahead of schedule, it moves back while more than a day's
/// burn of slack remains.
#[must_use]
pub fn completion_date(
    deadline: NaiveDate,
    excess: f64,
    velocity: f64,
    calendar: &(impl WorkingCalendar + ?Sized),
) -> CompletionForecast {
    if excess.abs() < f64::EPSILON {
        return CompletionForecast::On(deadline);
    }
    if velocity <= 0.0 {
        return CompletionForecast::Never;
    }

    let mut date = deadline;
    let mut left = excess;
    let mut steps = 0;

    if left > 0.0 {
        while left > 0.0 {
            if steps == MAX_FORECAST_STEPS {
                return CompletionForecast::Never;
            }
            let Some(next) = calendar.next_working_day(date) else {
                return CompletionForecast::Never;
            };
            date = next;
            left -= velocity;
            steps += 1;
        }
    } else {
        while left.abs() > velocity && steps < MAX_FORECAST_STEPS {
            let Some(prev) = calendar.previous_working_day(date) else {
                break;
            };
            date = prev;
            left += velocity;
            steps += 1;
        }
    }

    CompletionForecast::On(date)
}

/// Projected excess for each day from tomorrow to the deadline.
///
/// Starts from the excess at the deadline and subtracts velocity on working
/// days only; values never go below zero and the projection stops on the day
/// the excess is burned. An excess of zero or less is already covered and
/// yields an empty map.
#[must_use]
pub fn future_burndown(
    today: NaiveDate,
    deadline: NaiveDate,
    excess: f64,
    velocity: f64,
    calendar: &(impl WorkingCalendar + ?Sized),
) -> BTreeMap<NaiveDate, f64> {
    let mut projection = BTreeMap::new();
    if excess <= 0.0 {
        return projection;
    }

    let mut value = excess;
    let Some(tomorrow) = today.succ_opt() else {
        return projection;
    };
    for day in tomorrow.iter_days().take_while(|d| *d <= deadline) {
        if calendar.is_working_day(day) {
            value = (value - velocity).max(0.0);
        }
        projection.insert(day, value);
        if value <= 0.0 {
            break;
        }
    }
    projection
}
