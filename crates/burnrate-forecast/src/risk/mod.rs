//! Backlog priority ordering and deadline risk classification.

pub mod classify;
pub mod priority;

pub use classify::{DEFAULT_RISK_FACTOR, RiskBuckets, RiskLevel, RiskedItem, classify, thresholds};
pub use priority::{chain_positions, sort_by_priority};
