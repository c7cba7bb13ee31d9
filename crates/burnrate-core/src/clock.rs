use chrono::{Local, NaiveDate};

/// Source of "today" for forecasting.
///
/// Day-boundary cache invalidation and every date computation read the
/// current day through this trait so tests and replays can pin it.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock frozen on a given day, advanced explicitly.
#[derive(Debug)]
pub struct FixedClock {
    today: std::sync::Mutex<NaiveDate>,
}

impl FixedClock {
    #[must_use]
    pub const fn new(today: NaiveDate) -> Self {
        Self {
            today: std::sync::Mutex::new(today),
        }
    }

    /// Move the clock to another day.
    pub fn set(&self, today: NaiveDate) {
        let mut guard = self
            .today
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = today;
    }

    /// Advance the clock by one day.
    pub fn advance_day(&self) {
        let mut guard = self
            .today
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(next) = guard.succ_opt() {
            *guard = next;
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self
            .today
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<T: Clock + ?Sized> Clock for std::sync::Arc<T> {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}
