// Vehicle id -> display name lookup used for series labels
use crate::domain::telemetry::VehicleId;
use crate::domain::vehicle::{fallback_name, Vehicle};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct VehicleDirectory {
    vehicles: Vec<Vehicle>,
    index: HashMap<VehicleId, usize>,
}

impl VehicleDirectory {
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        let mut directory = Self::default();
        for vehicle in vehicles {
            match directory.index.get(&vehicle.id) {
                // Later listings win for duplicated ids
                Some(&pos) => directory.vehicles[pos] = vehicle,
                None => {
                    directory.index.insert(vehicle.id.clone(), directory.vehicles.len());
                    directory.vehicles.push(vehicle);
                }
            }
        }
        directory
    }

    pub fn resolve_vehicle_name(&self, id: &VehicleId) -> String {
        self.index
            .get(id)
            .map(|&pos| self.vehicles[pos].name.clone())
            .unwrap_or_else(|| fallback_name(id))
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn contains(&self, id: &VehicleId) -> bool {
        self.index.contains_key(id)
    }
}
