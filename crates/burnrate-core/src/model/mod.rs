//! Domain model: releases, raw and normalized burndown history, backlog items.

pub mod history;
pub mod item;
pub mod quantity;
pub mod release;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use history::{HistoryEntry, NormalizedBurndownHistory, RawBurndownHistory};
pub use item::{BacklogItem, ItemKind, ItemStatus, PriorityLink};
pub use quantity::{ParseEnumError, PredictionSpan, TrackedQuantity};
pub use release::{Release, SprintWindow};

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier.
            #[must_use]
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Borrow the raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::new(raw)
            }
        }
    };
}

opaque_id!(
    /// Opaque handle of a release (milestone) in the project data source.
    ReleaseId
);

opaque_id!(
    /// Opaque handle of a backlog item, task or bug.
    ItemId
);

opaque_id!(
    /// Opaque handle of a sprint.
    SprintId
);
