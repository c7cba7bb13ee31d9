//! Low/medium/high risk partition of the remaining backlog.

use burnrate_core::model::{BacklogItem, ItemId, TrackedQuantity};
use serde::{Deserialize, Serialize};

/// Risk factor used when none is configured.
pub const DEFAULT_RISK_FACTOR: f64 = 0.2;

/// Risk of not finishing an item by the deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// One classified item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskedItem {
    pub id: ItemId,
    pub name: String,
    pub quantity: f64,
    /// Running total of the backlog up to and including this item.
    pub cumulative: f64,
}

/// Priority-ordered items split by risk, with the thresholds used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskBuckets {
    pub low: Vec<RiskedItem>,
    pub medium: Vec<RiskedItem>,
    pub high: Vec<RiskedItem>,
    pub lower_threshold: f64,
    pub upper_threshold: f64,
}

impl RiskBuckets {
    #[must_use]
    pub fn bucket(&self, level: RiskLevel) -> &[RiskedItem] {
        match level {
            RiskLevel::Low => &self.low,
            RiskLevel::Medium => &self.medium,
            RiskLevel::High => &self.high,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.low.len() + self.medium.len() + self.high.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Capacity band `(lower, upper)` for the days left at `velocity`.
///
/// `risk_factor` is clamped into `[0, 1]`.
#[must_use]
pub fn thresholds(remaining_working_days: u32, velocity: f64, risk_factor: f64) -> (f64, f64) {
    let risk_factor = if risk_factor.is_nan() {
        DEFAULT_RISK_FACTOR
    } else {
        risk_factor.clamp(0.0, 1.0)
    };
    let capacity = f64::from(remaining_working_days) * velocity;
    (capacity * (1.0 - risk_factor), capacity * (1.0 + risk_factor))
}

/// Bucket `items`, already in priority order, by how deep into the backlog
/// their running total reaches.
///
/// An item whose running total reaches `upper` is high risk; one reaching
/// `lower` is medium; everything before is low. Both bounds are inclusive.
#[must_use]
pub fn classify(
    items: &[BacklogItem],
    quantity: TrackedQuantity,
    remaining_working_days: u32,
    velocity: f64,
    risk_factor: f64,
) -> RiskBuckets {
    let (lower, upper) = thresholds(remaining_working_days, velocity, risk_factor);
    let mut buckets = RiskBuckets {
        lower_threshold: lower,
        upper_threshold: upper,
        ..RiskBuckets::default()
    };

    let mut aggregated = 0.0;
    for item in items {
        let amount = item.quantity(quantity);
        let cumulative = aggregated + amount;
        let risked = RiskedItem {
            id: item.id.clone(),
            name: item.name.clone(),
            quantity: amount,
            cumulative,
        };

        if cumulative >= upper {
            buckets.high.push(risked);
        } else if cumulative >= lower {
            buckets.medium.push(risked);
        } else {
            buckets.low.push(risked);
        }
        aggregated = cumulative;
    }
    buckets
}
