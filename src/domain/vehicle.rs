// Vehicle domain model
use super::telemetry::VehicleId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub name: String,
}

impl Vehicle {
    pub fn new(id: VehicleId, name: &str) -> Self {
        let name = Self::format_name(&id, name);
        Self { id, name }
    }

    fn format_name(id: &VehicleId, name: &str) -> String {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            fallback_name(id)
        } else {
            trimmed.to_string()
        }
    }
}

/// Label used when the directory has no name for a vehicle.
pub fn fallback_name(id: &VehicleId) -> String {
    format!("ID: {}", id)
}
