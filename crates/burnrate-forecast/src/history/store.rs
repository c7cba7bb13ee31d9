use std::sync::Arc;

use burnrate_core::error::ForecastError;
use burnrate_core::model::{RawBurndownHistory, ReleaseId, TrackedQuantity};
use burnrate_core::source::{HistoryFetch, HistorySource};
use tracing::{debug, warn};

use crate::cache::ForecastCache;
use crate::retry::RetryPolicy;

/// Raw history per release, refreshed from a [`HistorySource`].
///
/// Fetches run without holding the release's cache lock so a slow, pending
/// backend never blocks readers of the cached value.
#[derive(Debug)]
pub struct RawHistoryStore<'a, S: ?Sized> {
    source: &'a S,
    cache: &'a ForecastCache,
    retry: RetryPolicy,
}

impl<'a, S: HistorySource + ?Sized> RawHistoryStore<'a, S> {
    #[must_use]
    pub const fn new(source: &'a S, cache: &'a ForecastCache, retry: RetryPolicy) -> Self {
        Self {
            source,
            cache,
            retry,
        }
    }

    /// Latest raw history of `quantity` for `release`.
    ///
    /// Polls the source while it reports pending. When every attempt is
    /// pending the previously cached history is returned, or `None` when
    /// nothing was ever cached.
    ///
    /// # Errors
    ///
    /// [`ForecastError::UnsupportedQuantityKind`] for quantities other than
    /// points and estimated days, checked before the source is asked.
    /// [`ForecastError::Source`] when the source itself fails.
    pub fn get_raw_history(
        &self,
        release: &ReleaseId,
        quantity: TrackedQuantity,
    ) -> Result<Option<Arc<RawBurndownHistory>>, ForecastError> {
        quantity.ensure_forecastable()?;

        let fetched = self.retry.poll(|_| {
            self.source
                .fetch_history(release, quantity)
                .map(|fetch| match fetch {
                    HistoryFetch::Ready(raw) => Some(raw),
                    HistoryFetch::Pending => None,
                })
        })?;

        let Some(fresh) = fetched else {
            let cached = self.cache.with_entry(release, |e| e.raw(quantity));
            warn!(
                release = %release,
                %quantity,
                attempts = self.retry.max_attempts(),
                has_cached = cached.is_some(),
                "history source still pending, using cached history"
            );
            return Ok(cached);
        };

        let (history, replaced) = self
            .cache
            .with_entry(release, |e| e.store_raw_if_newer(fresh));
        debug!(
            release = %release,
            %quantity,
            entries = history.entries().len(),
            replaced,
            "raw history refreshed"
        );
        Ok(Some(history))
    }
}
