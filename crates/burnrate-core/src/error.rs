use std::fmt;

use crate::model::{ReleaseId, TrackedQuantity};

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    SnapshotParseError,
    ReleaseNotFound,
    UnsupportedQuantityKind,
    SourceUnavailable,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::SnapshotParseError => "E1004",
            Self::ReleaseNotFound => "E2001",
            Self::UnsupportedQuantityKind => "E2005",
            Self::SourceUnavailable => "E5003",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::SnapshotParseError => "Snapshot file parse error",
            Self::ReleaseNotFound => "Release not found",
            Self::UnsupportedQuantityKind => "Quantity cannot be forecast",
            Self::SourceUnavailable => "Project data source failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .burnrate/config.toml and retry."),
            Self::SnapshotParseError => {
                Some("Re-export the project snapshot; it must be valid JSON.")
            }
            Self::ReleaseNotFound => Some("Check the release id against the snapshot."),
            Self::UnsupportedQuantityKind => {
                Some("Use `points` or `estimated_days` for forecasting.")
            }
            Self::SourceUnavailable => Some("Check that the project data source is reachable."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors surfaced by forecasting operations.
///
/// Missing history and stalled releases are not errors: the former is an
/// empty result and the latter a `Never` completion forecast.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    /// Forecasting was requested for a quantity other than points or
    /// estimated days. Not retried.
    #[error("quantity `{0}` cannot be forecast")]
    UnsupportedQuantityKind(TrackedQuantity),

    /// The data source has no release with this id.
    #[error("release not found: {0}")]
    ReleaseNotFound(ReleaseId),

    /// A collaborator failed while answering a query.
    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

impl ForecastError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedQuantityKind(_) => ErrorCode::UnsupportedQuantityKind,
            Self::ReleaseNotFound(_) => ErrorCode::ReleaseNotFound,
            Self::Source(_) => ErrorCode::SourceUnavailable,
        }
    }

    /// Optional remediation hint for operators and agents.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}
