//! In-memory project used by the integration tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use burnrate_core::calendar::{WeekdayCalendar, WorkingCalendar};
use burnrate_core::model::{
    BacklogItem, HistoryEntry, ItemId, ItemKind, ItemStatus, PredictionSpan, PriorityLink,
    RawBurndownHistory, Release, ReleaseId, SprintId, SprintWindow, TrackedQuantity,
};
use burnrate_core::source::{
    BacklogSource, HistoryFetch, HistorySource, ProjectSettings, ReleaseDirectory,
};
use chrono::{Days, NaiveDate, TimeZone, Utc};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub struct FakeProject {
    pub releases: Vec<Release>,
    pub calendar: WeekdayCalendar,
    pub span: PredictionSpan,
    pub history: Mutex<Vec<HistoryEntry>>,
    pub items: Mutex<Vec<BacklogItem>>,
    pub pending: AtomicBool,
    pub fetches: AtomicU32,
}

impl FakeProject {
    pub fn new(release: Release, calendar: WeekdayCalendar) -> Self {
        Self {
            releases: vec![release],
            calendar,
            span: PredictionSpan::default(),
            history: Mutex::new(Vec::new()),
            items: Mutex::new(Vec::new()),
            pending: AtomicBool::new(false),
            fetches: AtomicU32::new(0),
        }
    }

    pub fn fetches(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn set_pending(&self, pending: bool) {
        self.pending.store(pending, Ordering::SeqCst);
    }

    /// Record `value` as the state at the end of `day`.
    pub fn record(&self, day: NaiveDate, value: f64) {
        let recorded = day.checked_add_days(Days::new(1)).expect("in range");
        let timestamp = Utc
            .from_utc_datetime(&recorded.and_hms_opt(6, 0, 0).expect("valid time"));
        self.history
            .lock()
            .expect("history lock")
            .push(HistoryEntry { timestamp, value });
    }

    pub fn set_items(&self, items: Vec<BacklogItem>) {
        *self.items.lock().expect("items lock") = items;
    }

    pub fn complete(&self, id: &str) {
        let mut items = self.items.lock().expect("items lock");
        for item in items.iter_mut().filter(|i| i.id.as_str() == id) {
            item.status = ItemStatus::Completed;
        }
    }
}

impl HistorySource for FakeProject {
    fn fetch_history(
        &self,
        release: &ReleaseId,
        quantity: TrackedQuantity,
    ) -> anyhow::Result<HistoryFetch> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.pending.load(Ordering::SeqCst) {
            return Ok(HistoryFetch::Pending);
        }
        let entries = self.history.lock().expect("history lock").clone();
        Ok(HistoryFetch::Ready(RawBurndownHistory::new(
            release.clone(),
            quantity,
            entries,
        )))
    }
}

impl BacklogSource for FakeProject {
    fn release_items(&self, release: &ReleaseId) -> anyhow::Result<Vec<BacklogItem>> {
        Ok(self
            .items
            .lock()
            .expect("items lock")
            .iter()
            .filter(|i| i.is_tagged_to(release))
            .cloned()
            .collect())
    }

    fn priority_links(&self) -> anyhow::Result<Vec<PriorityLink>> {
        Ok(self
            .items
            .lock()
            .expect("items lock")
            .iter()
            .filter(|i| i.kind == ItemKind::Backlog)
            .map(|i| PriorityLink {
                id: i.id.clone(),
                previous: i.previous.clone(),
            })
            .collect())
    }
}

impl ReleaseDirectory for FakeProject {
    fn release(&self, id: &ReleaseId) -> anyhow::Result<Option<Release>> {
        Ok(self.releases.iter().find(|r| &r.id == id).cloned())
    }
}

impl ProjectSettings for FakeProject {
    fn prediction_span(&self) -> PredictionSpan {
        self.span
    }
}

impl WorkingCalendar for FakeProject {
    fn is_working_day(&self, date: NaiveDate) -> bool {
        self.calendar.is_working_day(date)
    }
}

pub fn release(start: Option<NaiveDate>, deadline: NaiveDate) -> Release {
    Release {
        id: ReleaseId::new("r1"),
        name: "Release 1".to_string(),
        deadline,
        sprints: start
            .map(|start| SprintWindow {
                id: SprintId::new("s1"),
                start,
                end: deadline,
            })
            .into_iter()
            .collect(),
    }
}

/// Backlog items tagged to `r1`, chained top to bottom in the given order.
pub fn chained_items(points: &[(&str, f64)]) -> Vec<BacklogItem> {
    let mut previous: Option<ItemId> = None;
    points
        .iter()
        .map(|(id, pts)| {
            let item = BacklogItem {
                id: ItemId::new(*id),
                name: format!("Story {id}"),
                kind: ItemKind::Backlog,
                points: *pts,
                estimated_days: *pts / 2.0,
                status: ItemStatus::NotDone,
                previous: previous.take(),
                releases: vec![ReleaseId::new("r1")],
            };
            previous = Some(item.id.clone());
            item
        })
        .collect()
}

/// Record a steady burn of `per_day` on every working day before `today`,
/// so that the value today equals `today_value`.
pub fn record_steady_burn(
    project: &FakeProject,
    start: NaiveDate,
    today: NaiveDate,
    today_value: f64,
    per_day: f64,
) {
    let mut day = today;
    let mut value = today_value;
    while let Some(prev) = project.calendar.previous_working_day(day) {
        if prev < start {
            break;
        }
        value += per_day;
        project.record(prev, value);
        day = prev;
    }
}
