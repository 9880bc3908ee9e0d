// Error taxonomy shared by every layer
use super::chart::ChartId;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Rejected synchronously, before anything reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("select at least one vehicle")]
    EmptyVehicleSelection,

    #[error("select at least one metric")]
    EmptyMetricSelection,

    #[error("date range start {from} must be before its end {to}")]
    MalformedDateRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

/// Failure of a single vehicle's fetch. Never aborts the rest of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend returned status {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("could not decode telemetry: {0}")]
    Decode(String),

    #[error("backend rejected request: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("chart {0} not found")]
    ChartNotFound(ChartId),
}

impl DashboardError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DashboardError::ChartNotFound(_))
    }
}
