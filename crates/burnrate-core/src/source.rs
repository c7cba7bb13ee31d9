//! Contracts of the project data source collaborators.
//!
//! The project-management server (or a file snapshot of it) answers these
//! queries; the forecasting engine never talks to it any other way.

use anyhow::Result;

use crate::calendar::WorkingCalendar;
use crate::model::{
    BacklogItem, PredictionSpan, PriorityLink, RawBurndownHistory, Release, ReleaseId,
    TrackedQuantity,
};

/// Outcome of a history query against an eventually-consistent backend.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryFetch {
    /// The backend has history for the pair.
    Ready(RawBurndownHistory),
    /// The backend is still computing; ask again later.
    Pending,
}

/// Raw burndown history per release and quantity.
pub trait HistorySource {
    /// Query the historical series for one release and quantity.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be queried at all. A backend
    /// that is merely not ready answers [`HistoryFetch::Pending`].
    fn fetch_history(&self, release: &ReleaseId, quantity: TrackedQuantity)
    -> Result<HistoryFetch>;
}

/// Backlog items and the product backlog priority chain.
pub trait BacklogSource {
    /// Every item currently tagged or committed to the release.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be queried.
    fn release_items(&self, release: &ReleaseId) -> Result<Vec<BacklogItem>>;

    /// All product backlog items with their priority chain predecessor.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be queried.
    fn priority_links(&self) -> Result<Vec<PriorityLink>>;
}

/// Lookup of releases by id.
pub trait ReleaseDirectory {
    /// # Errors
    ///
    /// Returns an error when the backend cannot be queried; an unknown id is
    /// `Ok(None)`.
    fn release(&self, id: &ReleaseId) -> Result<Option<Release>>;
}

/// Project-level settings that influence forecasting.
pub trait ProjectSettings {
    /// Lookback window of the weighted velocity average.
    fn prediction_span(&self) -> PredictionSpan;
}

/// Everything the forecasting engine reads from a project.
pub trait ProjectSource:
    HistorySource + BacklogSource + ReleaseDirectory + ProjectSettings + WorkingCalendar
{
}

impl<T> ProjectSource for T where
    T: HistorySource + BacklogSource + ReleaseDirectory + ProjectSettings + WorkingCalendar
{
}
