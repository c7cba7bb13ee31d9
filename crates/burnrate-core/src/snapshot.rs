//! File-backed project data source.
//!
//! A snapshot is a JSON export of everything the engine reads from a
//! project: settings, working calendar, releases, raw history and backlog
//! items. It implements every collaborator trait so forecasts can run
//! without a live server.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{WeekdayCalendar, WorkingCalendar};
use crate::model::{
    BacklogItem, HistoryEntry, ItemKind, PredictionSpan, PriorityLink, RawBurndownHistory,
    Release, ReleaseId, TrackedQuantity,
};
use crate::source::{BacklogSource, HistoryFetch, HistorySource, ProjectSettings, ReleaseDirectory};

/// Project-wide settings section of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub prediction_span: PredictionSpan,
    #[serde(default)]
    pub calendar: WeekdayCalendar,
}

/// Recorded history of one quantity for one release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub release: ReleaseId,
    pub quantity: TrackedQuantity,
    #[serde(default)]
    pub entries: Vec<HistoryEntry>,
}

/// In-memory project export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub project: ProjectInfo,
    #[serde(default)]
    pub releases: Vec<Release>,
    #[serde(default)]
    pub history: Vec<HistoryRecord>,
    #[serde(default)]
    pub items: Vec<BacklogItem>,
}

impl Snapshot {
    /// Read and parse a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid snapshot.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let snapshot = Self::from_json(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            releases = snapshot.releases.len(),
            items = snapshot.items.len(),
            "loaded project snapshot"
        );
        Ok(snapshot)
    }

    /// Parse a snapshot from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid snapshot.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

impl HistorySource for Snapshot {
    fn fetch_history(
        &self,
        release: &ReleaseId,
        quantity: TrackedQuantity,
    ) -> Result<HistoryFetch> {
        let record = self
            .history
            .iter()
            .find(|h| &h.release == release && h.quantity == quantity);

        if let Some(h) = record {
            return Ok(HistoryFetch::Ready(RawBurndownHistory::new(
                h.release.clone(),
                h.quantity,
                h.entries.clone(),
            )));
        }
        // A snapshot is complete: a known release without records has no history.
        if self.releases.iter().any(|r| &r.id == release) {
            return Ok(HistoryFetch::Ready(RawBurndownHistory::new(
                release.clone(),
                quantity,
                Vec::new(),
            )));
        }
        Ok(HistoryFetch::Pending)
    }
}

impl BacklogSource for Snapshot {
    fn release_items(&self, release: &ReleaseId) -> Result<Vec<BacklogItem>> {
        Ok(self
            .items
            .iter()
            .filter(|item| item.is_tagged_to(release))
            .cloned()
            .collect())
    }

    fn priority_links(&self) -> Result<Vec<PriorityLink>> {
        Ok(self
            .items
            .iter()
            .filter(|item| item.kind == ItemKind::Backlog)
            .map(|item| PriorityLink {
                id: item.id.clone(),
                previous: item.previous.clone(),
            })
            .collect())
    }
}

impl ReleaseDirectory for Snapshot {
    fn release(&self, id: &ReleaseId) -> Result<Option<Release>> {
        Ok(self.releases.iter().find(|r| &r.id == id).cloned())
    }
}

impl ProjectSettings for Snapshot {
    fn prediction_span(&self) -> PredictionSpan {
        self.project.prediction_span
    }
}

impl WorkingCalendar for Snapshot {
    fn is_working_day(&self, date: NaiveDate) -> bool {
        self.project.calendar.is_working_day(date)
    }
}
