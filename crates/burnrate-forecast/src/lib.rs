#![forbid(unsafe_code)]
//! burnrate-forecast library.
//!
//! Turns raw, irregular burndown history into a daily series, a weighted
//! velocity, a completion forecast and a risk split of the remaining backlog.
//!
//! The pure building blocks ([`history::normalize_series`],
//! [`velocity::weighted_velocity`], [`predict`], [`risk`]) take already
//! fetched data. [`Forecaster`] ties them to a project data source and a
//! per-release cache.
//!
//! # Conventions
//!
//! - **Errors**: Use [`burnrate_core::ForecastError`] for return types.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod cache;
pub mod engine;
pub mod history;
pub mod predict;
pub mod retry;
pub mod risk;
pub mod velocity;

pub use cache::ForecastCache;
pub use engine::{ForecastSummary, Forecaster};
pub use predict::CompletionForecast;
pub use retry::{Backoff, RetryPolicy};
pub use risk::{DEFAULT_RISK_FACTOR, RiskBuckets, RiskLevel, RiskedItem};
