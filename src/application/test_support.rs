// Shared fixtures for application-layer tests
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::error::FetchError;
use crate::domain::telemetry::{DateRange, TelemetrySample, VehicleId};
use crate::domain::vehicle::Vehicle;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 17, 0, 0, 0).unwrap()
}

pub fn range() -> DateRange {
    DateRange::new(base_time(), base_time() + Duration::days(1)).unwrap()
}

pub fn sample(hour: i64, metrics: &[(&str, f64)]) -> TelemetrySample {
    let metrics: BTreeMap<String, f64> = metrics.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    TelemetrySample::new(base_time() + Duration::hours(hour), metrics)
}

/// `count` hourly samples of one metric, values 0, 1, 2, ...
pub fn hourly(key: &str, count: usize) -> Vec<TelemetrySample> {
    (0..count).map(|i| sample(i as i64, &[(key, i as f64)])).collect()
}

pub fn vid(id: &str) -> VehicleId {
    VehicleId::from(id)
}

pub fn keys(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

enum Scripted {
    Ok(Vec<TelemetrySample>),
    Err(FetchError),
}

/// In-memory repository with scripted per-vehicle answers. Vehicles can be
/// gated so their response is held until the returned `Notify` fires.
#[derive(Default)]
pub struct FakeRepository {
    vehicles: Vec<Vehicle>,
    answers: Mutex<HashMap<VehicleId, Vec<Scripted>>>,
    gates: Mutex<HashMap<VehicleId, Arc<Notify>>>,
    calls: Mutex<Vec<VehicleId>>,
}

impl FakeRepository {
    pub fn new(vehicles: &[(&str, &str)]) -> Self {
        Self {
            vehicles: vehicles
                .iter()
                .map(|(id, name)| Vehicle::new(vid(id), name))
                .collect(),
            ..Self::default()
        }
    }

    /// Queue an answer; answers for a vehicle are consumed in order and the
    /// last one repeats.
    pub fn answer(&self, id: &str, samples: Vec<TelemetrySample>) {
        self.push(id, Scripted::Ok(samples));
    }

    pub fn fail(&self, id: &str, error: FetchError) {
        self.push(id, Scripted::Err(error));
    }

    fn push(&self, id: &str, answer: Scripted) {
        self.answers.lock().unwrap().entry(vid(id)).or_default().push(answer);
    }

    pub fn gate(&self, id: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(vid(id), notify.clone());
        notify
    }

    pub fn calls(&self) -> Vec<VehicleId> {
        self.calls.lock().unwrap().clone()
    }

    fn next_answer(&self, id: &VehicleId) -> Result<Vec<TelemetrySample>, FetchError> {
        let mut answers = self.answers.lock().unwrap();
        let queue = match answers.get_mut(id) {
            Some(queue) if !queue.is_empty() => queue,
            _ => return Ok(Vec::new()),
        };
        let answer = if queue.len() > 1 { queue.remove(0) } else { clone_answer(&queue[0]) };
        match answer {
            Scripted::Ok(samples) => Ok(samples),
            Scripted::Err(e) => Err(e),
        }
    }
}

fn clone_answer(answer: &Scripted) -> Scripted {
    match answer {
        Scripted::Ok(samples) => Scripted::Ok(samples.clone()),
        Scripted::Err(e) => Scripted::Err(e.clone()),
    }
}

#[async_trait]
impl TelemetryRepository for FakeRepository {
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, FetchError> {
        Ok(self.vehicles.clone())
    }

    async fn fetch_telemetry(
        &self,
        vehicle_id: &VehicleId,
        _metric_keys: &[String],
        _range: DateRange,
    ) -> Result<Vec<TelemetrySample>, FetchError> {
        self.calls.lock().unwrap().push(vehicle_id.clone());
        // Take the answer at issuance so a gated call keeps its own script entry
        let answer = self.next_answer(vehicle_id);
        let gate = self.gates.lock().unwrap().remove(vehicle_id);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        answer
    }
}
