use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ReleaseId, SprintId};

/// Date window of a sprint that contributes to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintWindow {
    pub id: SprintId,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// A milestone that backlog items are tagged against.
///
/// Releases are owned by the project data source; the engine only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: ReleaseId,
    #[serde(default)]
    pub name: String,
    /// Target date of the release.
    pub deadline: NaiveDate,
    /// Sprints tagged to this release.
    #[serde(default)]
    pub sprints: Vec<SprintWindow>,
}

impl Release {
    /// First day of the earliest contributing sprint.
    ///
    /// `None` means the release has not started: no sprint is tagged to it.
    #[must_use]
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.sprints.iter().map(|s| s.start).min()
    }

    /// Whether the release has started as of `today`.
    #[must_use]
    pub fn has_started(&self, today: NaiveDate) -> bool {
        self.start_date().is_some_and(|start| start <= today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sprint(id: &str, start: NaiveDate, end: NaiveDate) -> SprintWindow {
        SprintWindow {
            id: SprintId::new(id),
            start,
            end,
        }
    }

    #[test]
    fn start_is_earliest_sprint_start() {
        let release = Release {
            id: ReleaseId::new("r1"),
            name: "Spring".to_string(),
            deadline: date(2026, 5, 29),
            sprints: vec![
                sprint("s2", date(2026, 4, 13), date(2026, 4, 24)),
                sprint("s1", date(2026, 3, 30), date(2026, 4, 10)),
            ],
        };
        assert_eq!(release.start_date(), Some(date(2026, 3, 30)));
        assert!(release.has_started(date(2026, 3, 30)));
        assert!(!release.has_started(date(2026, 3, 29)));
    }

    #[test]
    fn release_without_sprints_has_not_started() {
        let release = Release {
            id: ReleaseId::new("r2"),
            name: String::new(),
            deadline: date(2026, 5, 29),
            sprints: vec![],
        };
        assert_eq!(release.start_date(), None);
        assert!(!release.has_started(date(2030, 1, 1)));
    }
}
