//! Forecasting façade over a project data source.
//!
//! [`Forecaster`] reads releases, history and backlog items through the
//! [`ProjectSource`] collaborator traits, memoizes per release in an injected
//! [`ForecastCache`], and answers every forecasting question for one
//! `(release, quantity)` pair.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use burnrate_core::clock::{Clock, SystemClock};
use burnrate_core::error::ForecastError;
use burnrate_core::model::{
    BacklogItem, NormalizedBurndownHistory, RawBurndownHistory, Release, ReleaseId,
    TrackedQuantity,
};
use burnrate_core::source::ProjectSource;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::cache::{ForecastCache, NormalizedLookup, NormalizedMemo};
use crate::history::{RawHistoryStore, normalize};
use crate::predict::{self, CompletionForecast};
use crate::retry::RetryPolicy;
use crate::risk::{self, RiskBuckets};
use crate::velocity::weighted_velocity;

/// Everything forecast for one release and quantity, as of one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSummary {
    pub release: ReleaseId,
    pub name: String,
    pub quantity: TrackedQuantity,
    pub unit: &'static str,
    pub today: NaiveDate,
    pub start: Option<NaiveDate>,
    pub deadline: NaiveDate,
    pub remaining: f64,
    pub velocity: f64,
    pub prediction_span: u32,
    pub remaining_working_days: u32,
    pub excess: f64,
    pub completion: CompletionForecast,
    pub on_track: bool,
    pub projection: BTreeMap<NaiveDate, f64>,
}

/// Release forecasting engine.
pub struct Forecaster<S> {
    source: S,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
    cache: Arc<ForecastCache>,
}

impl<S> std::fmt::Debug for Forecaster<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forecaster")
            .field("retry", &self.retry)
            .field("cached_releases", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl<S: ProjectSource> Forecaster<S> {
    /// Engine over `source` using the local date, default retry policy and a
    /// private cache.
    pub fn new(source: S) -> Self {
        Self {
            source,
            clock: Arc::new(SystemClock),
            retry: RetryPolicy::default(),
            cache: Arc::new(ForecastCache::new()),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Share `cache` with other engines over the same project.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<ForecastCache>) -> Self {
        self.cache = cache;
        self
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &ForecastCache {
        &self.cache
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// # Errors
    ///
    /// [`ForecastError::ReleaseNotFound`] for an unknown id, or
    /// [`ForecastError::Source`] when the directory cannot be queried.
    pub fn release(&self, id: &ReleaseId) -> Result<Release, ForecastError> {
        self.source
            .release(id)?
            .ok_or_else(|| ForecastError::ReleaseNotFound(id.clone()))
    }

    /// Latest raw history, falling back to the cache while the source is
    /// pending.
    ///
    /// # Errors
    ///
    /// See [`RawHistoryStore::get_raw_history`].
    #[instrument(skip_all, fields(release = %release, %quantity))]
    pub fn raw_history(
        &self,
        release: &ReleaseId,
        quantity: TrackedQuantity,
    ) -> Result<Option<Arc<RawBurndownHistory>>, ForecastError> {
        RawHistoryStore::new(&self.source, &self.cache, self.retry)
            .get_raw_history(release, quantity)
    }

    /// Sum of `quantity` over the release's items that are not completed.
    ///
    /// # Errors
    ///
    /// Unsupported quantity, or a backlog source failure.
    pub fn current_remaining(
        &self,
        release: &ReleaseId,
        quantity: TrackedQuantity,
    ) -> Result<f64, ForecastError> {
        let quantity = quantity.ensure_forecastable()?;
        let items = remaining_items(self.source.release_items(release)?);
        Ok(items.iter().map(|item| item.quantity(quantity)).sum())
    }

    /// Daily series from the first recorded day to today.
    ///
    /// `None` when the release has not started or has no history yet.
    ///
    /// # Errors
    ///
    /// Unsupported quantity, unknown release, or a source failure.
    #[instrument(skip_all, fields(release = %release, %quantity))]
    pub fn normalized_history(
        &self,
        release: &ReleaseId,
        quantity: TrackedQuantity,
    ) -> Result<Option<Arc<NormalizedBurndownHistory>>, ForecastError> {
        let quantity = quantity.ensure_forecastable()?;
        let release = self.release(release)?;
        self.normalized_for(&release, quantity, self.today())
    }

    /// Recency-weighted velocity over the project's prediction span.
    ///
    /// `0.0` when there is no normalized history.
    ///
    /// # Errors
    ///
    /// Unsupported quantity, unknown release, or a source failure.
    #[instrument(skip_all, fields(release = %release, %quantity))]
    pub fn predicted_velocity(
        &self,
        release: &ReleaseId,
        quantity: TrackedQuantity,
    ) -> Result<f64, ForecastError> {
        let quantity = quantity.ensure_forecastable()?;
        let release = self.release(release)?;
        self.velocity_for(&release, quantity, self.today())
    }

    /// Working days after today up to and including the deadline.
    ///
    /// # Errors
    ///
    /// Unknown release, or a source failure.
    pub fn remaining_working_days(&self, release: &ReleaseId) -> Result<u32, ForecastError> {
        let release = self.release(release)?;
        Ok(predict::remaining_working_days(
            self.today(),
            release.deadline,
            &self.source,
        ))
    }

    /// Quantity expected to be left at the deadline.
    ///
    /// # Errors
    ///
    /// Unsupported quantity, unknown release, or a source failure.
    #[instrument(skip_all, fields(release = %release, %quantity))]
    pub fn excess_at_deadline(
        &self,
        release: &ReleaseId,
        quantity: TrackedQuantity,
    ) -> Result<f64, ForecastError> {
        Ok(self.summary(release, quantity)?.excess)
    }

    /// Day the remaining work is expected to be done.
    ///
    /// # Errors
    ///
    /// Unsupported quantity, unknown release, or a source failure.
    #[instrument(skip_all, fields(release = %release, %quantity))]
    pub fn predicted_completion_date(
        &self,
        release: &ReleaseId,
        quantity: TrackedQuantity,
    ) -> Result<CompletionForecast, ForecastError> {
        Ok(self.summary(release, quantity)?.completion)
    }

    /// Projected excess per day from tomorrow to the deadline; empty when the
    /// release is on track.
    ///
    /// # Errors
    ///
    /// Unsupported quantity, unknown release, or a source failure.
    #[instrument(skip_all, fields(release = %release, %quantity))]
    pub fn future_burndown(
        &self,
        release: &ReleaseId,
        quantity: TrackedQuantity,
    ) -> Result<BTreeMap<NaiveDate, f64>, ForecastError> {
        Ok(self.summary(release, quantity)?.projection)
    }

    /// Items not yet completed, highest priority first.
    ///
    /// # Errors
    ///
    /// A backlog source failure.
    pub fn remaining_items_by_priority(
        &self,
        release: &ReleaseId,
    ) -> Result<Vec<BacklogItem>, ForecastError> {
        let items = remaining_items(self.source.release_items(release)?);
        let links = self.source.priority_links()?;
        Ok(risk::sort_by_priority(items, &links))
    }

    /// Split the remaining backlog into low, medium and high risk.
    ///
    /// # Errors
    ///
    /// Unsupported quantity, unknown release, or a source failure.
    #[instrument(skip_all, fields(release = %release, %quantity))]
    pub fn classify_by_risk(
        &self,
        release: &ReleaseId,
        quantity: TrackedQuantity,
        risk_factor: f64,
    ) -> Result<RiskBuckets, ForecastError> {
        let quantity = quantity.ensure_forecastable()?;
        let found = self.release(release)?;
        let today = self.today();

        let velocity = self.velocity_for(&found, quantity, today)?;
        let days = predict::remaining_working_days(today, found.deadline, &self.source);
        let items = self.remaining_items_by_priority(release)?;

        let buckets = risk::classify(&items, quantity, days, velocity, risk_factor);
        debug!(
            low = buckets.low.len(),
            medium = buckets.medium.len(),
            high = buckets.high.len(),
            "classified backlog by risk"
        );
        Ok(buckets)
    }

    /// Remaining work, velocity, excess, completion date and projection.
    ///
    /// # Errors
    ///
    /// Unsupported quantity, unknown release, or a source failure.
    #[instrument(skip_all, fields(release = %release, %quantity))]
    pub fn summary(
        &self,
        release: &ReleaseId,
        quantity: TrackedQuantity,
    ) -> Result<ForecastSummary, ForecastError> {
        let quantity = quantity.ensure_forecastable()?;
        let found = self.release(release)?;
        let today = self.today();

        let remaining = self.current_remaining(release, quantity)?;
        let velocity = self.velocity_for(&found, quantity, today)?;
        let days = predict::remaining_working_days(today, found.deadline, &self.source);
        let excess = predict::excess(remaining, days, velocity);
        let completion = predict::completion_date(found.deadline, excess, velocity, &self.source);
        let projection =
            predict::future_burndown(today, found.deadline, excess, velocity, &self.source);

        Ok(ForecastSummary {
            release: found.id.clone(),
            name: found.name.clone(),
            quantity,
            unit: quantity.unit(),
            today,
            start: found.start_date(),
            deadline: found.deadline,
            remaining,
            velocity,
            prediction_span: self.source.prediction_span().days(),
            remaining_working_days: days,
            excess,
            completion,
            on_track: excess <= 0.0,
            projection,
        })
    }

    fn normalized_for(
        &self,
        release: &Release,
        quantity: TrackedQuantity,
        today: NaiveDate,
    ) -> Result<Option<Arc<NormalizedBurndownHistory>>, ForecastError> {
        if !release.has_started(today) {
            debug!("release has not started");
            return Ok(None);
        }

        let raw = self.raw_history(&release.id, quantity)?;
        let current = self.current_remaining(&release.id, quantity)?;
        let generation = raw.as_ref().and_then(|r| r.last_time_entry());

        let series = self.cache.with_entry(&release.id, |entry| {
            match entry.lookup_normalized(quantity, today, generation, current) {
                NormalizedLookup::Hit(series) => {
                    debug!("normalized history cache hit");
                    series
                }
                NormalizedLookup::Patched(series) => {
                    debug!(current, "patched today's value in cached history");
                    Some(series)
                }
                NormalizedLookup::Miss => {
                    let series = normalize(release, raw.as_deref(), current, today, &self.source)
                        .map(Arc::new);
                    debug!(
                        days = series.as_ref().map_or(0, |s| s.len()),
                        "rebuilt normalized history"
                    );
                    entry.store_normalized(
                        quantity,
                        NormalizedMemo {
                            day: today,
                            generation,
                            series: series.clone(),
                        },
                    );
                    series
                }
            }
        });
        Ok(series)
    }

    fn velocity_for(
        &self,
        release: &Release,
        quantity: TrackedQuantity,
        today: NaiveDate,
    ) -> Result<f64, ForecastError> {
        let Some(series) = self.normalized_for(release, quantity, today)? else {
            return Ok(0.0);
        };
        let span = self.source.prediction_span();

        let velocity = self.cache.with_entry(&release.id, |entry| {
            if let Some(cached) = entry.velocity(quantity, span) {
                return cached;
            }
            let velocity = weighted_velocity(&series, today, span, &self.source);
            // Only memoize against the series the entry still holds.
            let current = entry
                .normalized(quantity)
                .and_then(|memo| memo.series.as_ref())
                .is_some_and(|held| Arc::ptr_eq(held, &series));
            if current {
                entry.store_velocity(quantity, span, velocity);
            }
            velocity
        });
        Ok(velocity)
    }
}

/// Items not completed, one record per canonical item (first wins).
fn remaining_items(items: Vec<BacklogItem>) -> Vec<BacklogItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| !item.is_completed())
        .filter(|item| seen.insert(item.canonical_id().clone()))
        .collect()
}
