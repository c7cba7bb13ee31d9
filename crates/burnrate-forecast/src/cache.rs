//! Per-release memoization of history, normalized series and velocities.
//!
//! [`ForecastCache`] is an explicit object injected into the engine. Every
//! release gets its own entry behind its own lock, so work on one release
//! never blocks another. Cached values are `Arc`-shared; callers keep the
//! snapshot they were handed even after the entry is updated.
//!
//! # Invalidation
//!
//! - Raw history is replaced only by a strictly newer data generation
//!   (see [`RawBurndownHistory::is_newer_than`]).
//! - A normalized series is keyed by the day it was built for and the raw
//!   generation it was built from. A new day or a new generation forces a
//!   rebuild. A changed value for today on the same day is patched in place.
//! - Velocities are dropped whenever the normalized series of their quantity
//!   is rebuilt or patched.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use burnrate_core::model::{
    NormalizedBurndownHistory, PredictionSpan, RawBurndownHistory, ReleaseId, TrackedQuantity,
};
use chrono::{DateTime, NaiveDate, Utc};

/// Memoized normalization result for one quantity.
#[derive(Debug, Clone)]
pub struct NormalizedMemo {
    /// Day the series ends on.
    pub day: NaiveDate,
    /// `last_time_entry` of the raw history it was built from.
    pub generation: Option<DateTime<Utc>>,
    /// `None` when normalization produced no series.
    pub series: Option<Arc<NormalizedBurndownHistory>>,
}

impl NormalizedMemo {
    /// Whether this memo was built for `day` from raw generation `generation`.
    #[must_use]
    pub fn is_current(&self, day: NaiveDate, generation: Option<DateTime<Utc>>) -> bool {
        self.day == day && self.generation == generation
    }
}

/// Outcome of looking up a normalized series in the cache.
#[derive(Debug, Clone)]
pub enum NormalizedLookup {
    /// Memo is current and today's value matches.
    Hit(Option<Arc<NormalizedBurndownHistory>>),
    /// Memo is current but today's value changed; the tail was patched.
    Patched(Arc<NormalizedBurndownHistory>),
    /// No usable memo; the caller must rebuild.
    Miss,
}

/// Everything cached for one release.
#[derive(Debug, Default)]
pub struct ReleaseCacheEntry {
    raw: HashMap<TrackedQuantity, Arc<RawBurndownHistory>>,
    normalized: HashMap<TrackedQuantity, NormalizedMemo>,
    velocity: HashMap<(TrackedQuantity, PredictionSpan), f64>,
}

impl ReleaseCacheEntry {
    #[must_use]
    pub fn raw(&self, quantity: TrackedQuantity) -> Option<Arc<RawBurndownHistory>> {
        self.raw.get(&quantity).cloned()
    }

    /// Store `fresh` unless the cached history is the same or a newer
    /// generation. Returns the history now cached and whether it changed.
    pub fn store_raw_if_newer(
        &mut self,
        fresh: RawBurndownHistory,
    ) -> (Arc<RawBurndownHistory>, bool) {
        let quantity = fresh.quantity();
        match self.raw.get(&quantity) {
            Some(cached) if !fresh.is_newer_than(cached) => (Arc::clone(cached), false),
            _ => {
                let fresh = Arc::new(fresh);
                self.raw.insert(quantity, Arc::clone(&fresh));
                (fresh, true)
            }
        }
    }

    #[must_use]
    pub fn normalized(&self, quantity: TrackedQuantity) -> Option<&NormalizedMemo> {
        self.normalized.get(&quantity)
    }

    /// Look up the series for `day` and raw `generation`, patching today's
    /// value when only that changed.
    ///
    /// A patch copies the series if another reader still holds it, so
    /// earlier snapshots never change under their holders.
    pub fn lookup_normalized(
        &mut self,
        quantity: TrackedQuantity,
        day: NaiveDate,
        generation: Option<DateTime<Utc>>,
        current_remaining: f64,
    ) -> NormalizedLookup {
        let Some(memo) = self.normalized.get_mut(&quantity) else {
            return NormalizedLookup::Miss;
        };
        if !memo.is_current(day, generation) {
            return NormalizedLookup::Miss;
        }
        let Some(series) = memo.series.as_mut() else {
            return NormalizedLookup::Hit(None);
        };
        if series.last_value().to_bits() == current_remaining.to_bits() {
            return NormalizedLookup::Hit(Some(Arc::clone(series)));
        }

        Arc::make_mut(series).set_last_value(current_remaining);
        let patched = Arc::clone(series);
        self.invalidate_velocity(quantity);
        NormalizedLookup::Patched(patched)
    }

    /// Replace the memo for `quantity` and drop its velocities.
    pub fn store_normalized(&mut self, quantity: TrackedQuantity, memo: NormalizedMemo) {
        self.normalized.insert(quantity, memo);
        self.invalidate_velocity(quantity);
    }

    #[must_use]
    pub fn velocity(&self, quantity: TrackedQuantity, span: PredictionSpan) -> Option<f64> {
        self.velocity.get(&(quantity, span)).copied()
    }

    pub fn store_velocity(&mut self, quantity: TrackedQuantity, span: PredictionSpan, value: f64) {
        self.velocity.insert((quantity, span), value);
    }

    /// Drop every cached velocity of `quantity`, whatever its span.
    pub fn invalidate_velocity(&mut self, quantity: TrackedQuantity) {
        self.velocity.retain(|(q, _), _| *q != quantity);
    }
}

/// Process-lifetime cache keyed by release id.
#[derive(Debug, Default)]
pub struct ForecastCache {
    releases: Mutex<HashMap<ReleaseId, Arc<Mutex<ReleaseCacheEntry>>>>,
}

impl ForecastCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the entry of `release`, created on first access.
    #[must_use]
    pub fn entry(&self, release: &ReleaseId) -> Arc<Mutex<ReleaseCacheEntry>> {
        let mut releases = self.releases.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(releases.entry(release.clone()).or_default())
    }

    /// Run `f` with the entry of `release` locked.
    pub fn with_entry<T>(
        &self,
        release: &ReleaseId,
        f: impl FnOnce(&mut ReleaseCacheEntry) -> T,
    ) -> T {
        let entry = self.entry(release);
        let mut guard = lock_entry(&entry);
        f(&mut guard)
    }

    /// Forget everything cached for `release`. Returns whether it was cached.
    pub fn evict(&self, release: &ReleaseId) -> bool {
        self.releases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(release)
            .is_some()
    }

    pub fn clear(&self) {
        self.releases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of releases with a cache entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.releases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock_entry(entry: &Mutex<ReleaseCacheEntry>) -> MutexGuard<'_, ReleaseCacheEntry> {
    entry.lock().unwrap_or_else(PoisonError::into_inner)
}
