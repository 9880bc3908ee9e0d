// Telemetry store - latest fetched samples per vehicle
use crate::domain::telemetry::{TelemetrySample, VehicleId};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct VehicleSeries {
    version: u64,
    samples: Arc<Vec<TelemetrySample>>,
}

/// Holds one ordered sample sequence per vehicle. Sequences are only ever
/// replaced wholesale; readers never see a half-written one.
#[derive(Debug, Default)]
pub struct TelemetryStore {
    series: HashMap<VehicleId, VehicleSeries>,
    next_version: u64,
}

impl TelemetryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_vehicle_series(&mut self, vehicle_id: VehicleId, mut samples: Vec<TelemetrySample>) {
        // Stable, so equal timestamps keep the backend's order
        samples.sort_by_key(|s| s.timestamp);
        self.next_version += 1;
        self.series.insert(
            vehicle_id,
            VehicleSeries {
                version: self.next_version,
                samples: Arc::new(samples),
            },
        );
    }

    pub fn get_vehicle_series(&self, vehicle_id: &VehicleId) -> &[TelemetrySample] {
        self.series
            .get(vehicle_id)
            .map(|s| s.samples.as_slice())
            .unwrap_or(&[])
    }

    /// Version stamp of a vehicle's sequence, 0 when nothing is stored.
    pub fn version_of(&self, vehicle_id: &VehicleId) -> u64 {
        self.series.get(vehicle_id).map(|s| s.version).unwrap_or(0)
    }

    pub fn contains(&self, vehicle_id: &VehicleId) -> bool {
        self.series.contains_key(vehicle_id)
    }

    pub fn sample_count(&self, vehicle_id: &VehicleId) -> usize {
        self.get_vehicle_series(vehicle_id).len()
    }

    pub fn remove(&mut self, vehicle_id: &VehicleId) -> bool {
        self.series.remove(vehicle_id).is_some()
    }

    pub fn clear(&mut self) {
        self.series.clear();
    }

    pub fn vehicles(&self) -> Vec<VehicleId> {
        let mut ids: Vec<VehicleId> = self.series.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn snapshot(&self) -> BTreeMap<VehicleId, Vec<TelemetrySample>> {
        self.series
            .iter()
            .map(|(id, s)| (id.clone(), s.samples.as_ref().clone()))
            .collect()
    }
}
