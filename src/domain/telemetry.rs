// Telemetry data domain models
use super::error::ValidationError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(String);

impl VehicleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VehicleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for VehicleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One timestamped reading of several metrics for a single vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub timestamp: DateTime<Utc>,
    pub metrics: BTreeMap<String, f64>,
}

impl TelemetrySample {
    pub fn new(timestamp: DateTime<Utc>, metrics: BTreeMap<String, f64>) -> Self {
        Self { timestamp, metrics }
    }

    pub fn metric(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).copied()
    }

    pub fn time_ms(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

/// Half-open query window `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, ValidationError> {
        if from >= to {
            return Err(ValidationError::MalformedDateRange { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        Self::new(self.from, self.to).map(|_| ())
    }

    pub fn span(&self) -> Duration {
        self.to - self.from
    }

    /// Same window length, moved so it ends at `now`. Windows already ending
    /// at or after `now` are returned unchanged.
    pub fn slide_to(&self, now: DateTime<Utc>) -> Self {
        if self.to >= now {
            return *self;
        }
        Self {
            from: now - self.span(),
            to: now,
        }
    }
}

/// Deduplicate while keeping first-seen order.
pub fn ordered_unique<T: PartialEq + Clone>(items: &[T]) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}
