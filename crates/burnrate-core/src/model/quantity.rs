use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::ForecastError;

/// A quantity whose history the data source records per release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedQuantity {
    Points,
    EstimatedDays,
    WorkRemaining,
    ItemCount,
}

impl TrackedQuantity {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::EstimatedDays => "estimated_days",
            Self::WorkRemaining => "work_remaining",
            Self::ItemCount => "item_count",
        }
    }

    /// Whether burndown forecasting is defined for this quantity.
    #[must_use]
    pub const fn is_forecastable(self) -> bool {
        matches!(self, Self::Points | Self::EstimatedDays)
    }

    /// Reject quantities the forecasting engine does not support.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::UnsupportedQuantityKind`] for anything other
    /// than points or estimated days.
    pub const fn ensure_forecastable(self) -> Result<Self, ForecastError> {
        if self.is_forecastable() {
            Ok(self)
        } else {
            Err(ForecastError::UnsupportedQuantityKind(self))
        }
    }

    /// Short unit label for human output.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Points => "pts",
            Self::EstimatedDays => "days",
            Self::WorkRemaining => "h",
            Self::ItemCount => "items",
        }
    }
}

impl fmt::Display for TrackedQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl FromStr for TrackedQuantity {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "points" | "pts" => Ok(Self::Points),
            "estimated_days" | "days" => Ok(Self::EstimatedDays),
            "work_remaining" => Ok(Self::WorkRemaining),
            "item_count" | "items" => Ok(Self::ItemCount),
            _ => Err(ParseEnumError {
                expected: "quantity",
                got: s.to_string(),
            }),
        }
    }
}

/// Lookback window of the weighted-average velocity, in working days.
///
/// The project settings offer a fixed menu of spans; anything else falls
/// back to the 14-day default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum PredictionSpan {
    Days3,
    Days5,
    Days7,
    Days10,
    Days14,
}

impl PredictionSpan {
    /// Map a configured day count to a span.
    #[must_use]
    pub const fn from_days(days: u32) -> Self {
        match days {
            3 => Self::Days3,
            5 => Self::Days5,
            7 => Self::Days7,
            10 => Self::Days10,
            _ => Self::Days14,
        }
    }

    /// Window length in working days.
    #[must_use]
    pub const fn days(self) -> u32 {
        match self {
            Self::Days3 => 3,
            Self::Days5 => 5,
            Self::Days7 => 7,
            Self::Days10 => 10,
            Self::Days14 => 14,
        }
    }
}

impl Default for PredictionSpan {
    fn default() -> Self {
        Self::Days14
    }
}

impl From<u32> for PredictionSpan {
    fn from(days: u32) -> Self {
        Self::from_days(days)
    }
}

impl From<PredictionSpan> for u32 {
    fn from(span: PredictionSpan) -> Self {
        span.days()
    }
}
