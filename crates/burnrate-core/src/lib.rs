#![forbid(unsafe_code)]
//! burnrate-core library.
//!
//! Domain model for release forecasting plus the contracts of the
//! collaborators the engine reads from (history, backlog, calendar,
//! settings, clock).
//!
//! # Conventions
//!
//! - **Errors**: typed errors via `thiserror` at crate boundaries; collaborator
//!   traits return `anyhow::Result` since their failures are opaque here.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod calendar;
pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod snapshot;
pub mod source;

pub use calendar::{WeekdayCalendar, WorkingCalendar};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ErrorCode, ForecastError};
pub use source::{
    BacklogSource, HistoryFetch, HistorySource, ProjectSettings, ProjectSource, ReleaseDirectory,
};
