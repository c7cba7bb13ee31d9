//! Project working calendar.
//!
//! Velocity and date stepping only count working days. The calendar is a
//! collaborator: the engine asks it about individual dates and never assumes
//! a weekend layout of its own.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Upper bound on how far calendar scans walk looking for a working day.
///
/// A calendar with no working day inside this window is treated as having
/// none at all.
pub const MAX_CALENDAR_SCAN_DAYS: u32 = 3_660;

/// Answers whether a date is a working day for the project.
pub trait WorkingCalendar {
    /// `true` when `date` is neither a weekend day nor a holiday.
    fn is_working_day(&self, date: NaiveDate) -> bool;

    /// Closest working day strictly before `date`.
    fn previous_working_day(&self, date: NaiveDate) -> Option<NaiveDate> {
        let mut day = date;
        for _ in 0..MAX_CALENDAR_SCAN_DAYS {
            day = day.pred_opt()?;
            if self.is_working_day(day) {
                return Some(day);
            }
        }
        None
    }

    /// Closest working day strictly after `date`.
    fn next_working_day(&self, date: NaiveDate) -> Option<NaiveDate> {
        let mut day = date;
        for _ in 0..MAX_CALENDAR_SCAN_DAYS {
            day = day.succ_opt()?;
            if self.is_working_day(day) {
                return Some(day);
            }
        }
        None
    }

    /// Number of working days `d` with `after < d <= until`.
    fn working_days_between(&self, after: NaiveDate, until: NaiveDate) -> u32 {
        if until <= after {
            return 0;
        }
        let mut count = 0;
        let mut day = after;
        while let Some(next) = day.succ_opt() {
            if next > until {
                break;
            }
            if self.is_working_day(next) {
                count += 1;
            }
            day = next;
        }
        count
    }
}

impl<T: WorkingCalendar + ?Sized> WorkingCalendar for &T {
    fn is_working_day(&self, date: NaiveDate) -> bool {
        (**self).is_working_day(date)
    }
}

/// Calendar built from recurring non-working weekdays plus explicit holidays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayCalendar {
    #[serde(default = "default_weekend")]
    pub non_working_weekdays: Vec<Weekday>,
    #[serde(default)]
    pub holidays: BTreeSet<NaiveDate>,
}

impl Default for WeekdayCalendar {
    fn default() -> Self {
        Self {
            non_working_weekdays: default_weekend(),
            holidays: BTreeSet::new(),
        }
    }
}

impl WeekdayCalendar {
    /// Calendar where every day is a working day.
    #[must_use]
    pub const fn every_day() -> Self {
        Self {
            non_working_weekdays: Vec::new(),
            holidays: BTreeSet::new(),
        }
    }

    /// Add a holiday, returning the calendar for chaining.
    #[must_use]
    pub fn with_holiday(mut self, date: NaiveDate) -> Self {
        self.holidays.insert(date);
        self
    }
}

impl WorkingCalendar for WeekdayCalendar {
    fn is_working_day(&self, date: NaiveDate) -> bool {
        !self.non_working_weekdays.contains(&date.weekday()) && !self.holidays.contains(&date)
    }
}

fn default_weekend() -> Vec<Weekday> {
    vec![Weekday::Sat, Weekday::Sun]
}
