// Repository trait for telemetry data access
use crate::domain::error::FetchError;
use crate::domain::telemetry::{DateRange, TelemetrySample, VehicleId};
use crate::domain::vehicle::Vehicle;
use async_trait::async_trait;

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// List every vehicle visible to the current backend session
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, FetchError>;

    /// Fetch one vehicle's samples for the given metrics and window.
    /// Implementations return samples sorted ascending by timestamp.
    async fn fetch_telemetry(
        &self,
        vehicle_id: &VehicleId,
        metric_keys: &[String],
        range: DateRange,
    ) -> Result<Vec<TelemetrySample>, FetchError>;
}
