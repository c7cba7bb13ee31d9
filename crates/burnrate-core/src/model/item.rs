use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::{ItemId, ParseEnumError, ReleaseId, TrackedQuantity};

/// Which flavour of work item a record is.
///
/// Committed variants are copies of a backlog item placed into a sprint or
/// the schedule; they point at the canonical backlog item that carries the
/// priority chain position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ItemKind {
    Backlog,
    CommittedToSprint { canonical: ItemId },
    CommittedToSchedule { canonical: ItemId },
    ScheduledTask,
    Bug,
}

impl Default for ItemKind {
    fn default() -> Self {
        Self::Backlog
    }
}

/// Workflow status of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    NotDone,
    InProgress,
    Blocked,
    ToBeDeleted,
    Completed,
}

impl Default for ItemStatus {
    fn default() -> Self {
        Self::NotDone
    }
}

impl ItemStatus {
    const fn as_str(self) -> &'static str {
        match self {
            Self::NotDone => "not_done",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::ToBeDeleted => "to_be_deleted",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "not_done" | "open" => Ok(Self::NotDone),
            "in_progress" => Ok(Self::InProgress),
            "blocked" => Ok(Self::Blocked),
            "to_be_deleted" => Ok(Self::ToBeDeleted),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}

/// Uniform view of a backlog item, scheduled task or bug.
///
/// Forecasting only needs quantities, completion status, release tags and
/// the priority chain predecessor, so every item flavour shares this record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacklogItem {
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: ItemKind,
    #[serde(default)]
    pub points: f64,
    #[serde(default)]
    pub estimated_days: f64,
    #[serde(default)]
    pub status: ItemStatus,
    /// Predecessor in the product backlog priority chain.
    #[serde(default)]
    pub previous: Option<ItemId>,
    /// Releases this item is tagged to.
    #[serde(default)]
    pub releases: Vec<ReleaseId>,
}

impl BacklogItem {
    /// Value of a tracked quantity on this item.
    ///
    /// Quantities that are not stored per item read as `0.0`, except the
    /// item count which is `1.0` per item.
    #[must_use]
    pub const fn quantity(&self, quantity: TrackedQuantity) -> f64 {
        match quantity {
            TrackedQuantity::Points => self.points,
            TrackedQuantity::EstimatedDays => self.estimated_days,
            TrackedQuantity::WorkRemaining => 0.0,
            TrackedQuantity::ItemCount => 1.0,
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == ItemStatus::Completed
    }

    /// Id of the underlying backlog item for committed variants, else own id.
    #[must_use]
    pub const fn canonical_id(&self) -> &ItemId {
        match &self.kind {
            ItemKind::CommittedToSprint { canonical }
            | ItemKind::CommittedToSchedule { canonical } => canonical,
            ItemKind::Backlog | ItemKind::ScheduledTask | ItemKind::Bug => &self.id,
        }
    }

    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(
            self.kind,
            ItemKind::CommittedToSprint { .. } | ItemKind::CommittedToSchedule { .. }
        )
    }

    #[must_use]
    pub fn is_tagged_to(&self, release: &ReleaseId) -> bool {
        self.releases.iter().any(|r| r == release)
    }
}

/// One node of the product backlog priority chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityLink {
    pub id: ItemId,
    pub previous: Option<ItemId>,
}
