pub mod completions;
pub mod forecast;
pub mod history;
pub mod risk;
pub mod velocity;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use burnrate_core::clock::{Clock, FixedClock, SystemClock};
use burnrate_core::config::ProjectConfig;
use burnrate_core::error::{ErrorCode, ForecastError};
use burnrate_core::model::{ReleaseId, TrackedQuantity};
use burnrate_core::snapshot::Snapshot;
use burnrate_forecast::{Forecaster, RetryPolicy};
use chrono::NaiveDate;
use tracing::debug;

use crate::output::{CliError, OutputMode, render_error};

/// Everything a forecasting command needs, resolved once in `main`.
pub struct CommandContext {
    pub project_root: PathBuf,
    pub config: ProjectConfig,
    pub output: OutputMode,
    pub snapshot: Option<PathBuf>,
    pub today: Option<NaiveDate>,
}

impl CommandContext {
    /// Snapshot path from `--snapshot`, else from project config, relative
    /// to the project root.
    pub fn snapshot_path(&self) -> PathBuf {
        let path = self
            .snapshot
            .as_deref()
            .unwrap_or(self.config.snapshot.path.as_path());
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    /// The quantity to forecast: the flag if given, else the configured default.
    pub const fn quantity(&self, flag: Option<TrackedQuantity>) -> TrackedQuantity {
        match flag {
            Some(quantity) => quantity,
            None => self.config.forecast.default_quantity,
        }
    }

    /// Load the snapshot and build an engine over it.
    pub fn open(&self) -> anyhow::Result<Forecaster<Snapshot>> {
        let path = self.snapshot_path();
        let snapshot = match load_snapshot(&path) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                render_error(
                    self.output,
                    &CliError::with_details(
                        format!("{e:#}"),
                        ErrorCode::SnapshotParseError.hint().unwrap_or_default(),
                        ErrorCode::SnapshotParseError.code(),
                    ),
                )?;
                return Err(e);
            }
        };

        let clock: Arc<dyn Clock> = match self.today {
            Some(day) => Arc::new(FixedClock::new(day)),
            None => Arc::new(SystemClock),
        };
        debug!(snapshot = %path.display(), today = %clock.today(), "opening forecaster");

        Ok(Forecaster::new(snapshot)
            .with_clock(clock)
            .with_retry(RetryPolicy::from_config(&self.config.retry)))
    }

    /// Render a forecasting failure and hand it back for the exit status.
    pub fn fail(&self, err: ForecastError) -> anyhow::Error {
        if let Err(render) = render_error(self.output, &CliError::from(&err)) {
            return render;
        }
        anyhow::Error::new(err)
    }
}

fn load_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    if !path.exists() {
        anyhow::bail!(
            "snapshot not found at {} (pass --snapshot or set [snapshot] path)",
            path.display()
        );
    }
    Snapshot::load(path)
}

/// Parse a release id argument.
pub fn release_id(raw: &str) -> ReleaseId {
    ReleaseId::new(raw.trim())
}
