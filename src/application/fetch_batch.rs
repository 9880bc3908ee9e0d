// Fetch batches - fan-out per vehicle, fan-in before anything is applied
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::chart::ChartId;
use crate::domain::dashboard::LoadState;
use crate::domain::error::{FetchError, ValidationError};
use crate::domain::telemetry::{ordered_unique, DateRange, TelemetrySample, VehicleId};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub vehicle_ids: Vec<VehicleId>,
    #[serde(default)]
    pub metric_keys: Vec<String>,
    pub range: DateRange,
}

impl FetchRequest {
    pub fn new(vehicle_ids: Vec<VehicleId>, metric_keys: Vec<String>, range: DateRange) -> Self {
        Self {
            vehicle_ids,
            metric_keys,
            range,
        }
    }

    /// Dedupe the selection and reject what must never reach the network.
    pub fn normalized(self) -> Result<Self, ValidationError> {
        let vehicle_ids = ordered_unique(&self.vehicle_ids);
        if vehicle_ids.is_empty() {
            return Err(ValidationError::EmptyVehicleSelection);
        }
        self.range.validate()?;
        Ok(Self {
            vehicle_ids,
            metric_keys: ordered_unique(&self.metric_keys),
            range: self.range,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub vehicle_id: VehicleId,
    seq: u64,
}

/// Issues monotonic tickets per vehicle. Only the newest ticket for a vehicle
/// may write to the store, whatever order responses arrive in. Vehicles left
/// out of a newer request have no live ticket at all.
#[derive(Debug, Default)]
pub struct FetchSequencer {
    next_seq: u64,
    next_batch: u64,
    latest: HashMap<VehicleId, u64>,
}

impl FetchSequencer {
    pub fn issue(&mut self, request: FetchRequest) -> FetchBatch {
        self.next_batch += 1;
        self.latest.retain(|id, _| request.vehicle_ids.contains(id));
        let tickets = request
            .vehicle_ids
            .iter()
            .map(|id| {
                self.next_seq += 1;
                self.latest.insert(id.clone(), self.next_seq);
                FetchTicket {
                    vehicle_id: id.clone(),
                    seq: self.next_seq,
                }
            })
            .collect();

        FetchBatch {
            batch: self.next_batch,
            request,
            tickets,
        }
    }

    pub fn is_latest(&self, ticket: &FetchTicket) -> bool {
        self.latest.get(&ticket.vehicle_id) == Some(&ticket.seq)
    }

    pub fn is_latest_batch(&self, batch: u64) -> bool {
        batch == self.next_batch
    }

    /// Invalidate every in-flight ticket.
    pub fn forget_all(&mut self) {
        self.latest.clear();
        // Also retires the current batch number
        self.next_batch += 1;
    }
}

#[derive(Debug, Clone)]
pub struct FetchBatch {
    pub batch: u64,
    pub request: FetchRequest,
    pub tickets: Vec<FetchTicket>,
}

#[derive(Debug)]
pub struct VehicleResult {
    pub ticket: FetchTicket,
    pub result: Result<Vec<TelemetrySample>, FetchError>,
}

/// Every fetch of a batch, settled. Nothing has been applied yet.
#[derive(Debug)]
pub struct SettledBatch {
    pub batch: u64,
    pub request: FetchRequest,
    pub results: Vec<VehicleResult>,
}

impl FetchBatch {
    /// Run one fetch per vehicle concurrently on the calling task and wait for
    /// all of them, successes and failures alike.
    pub async fn run(self, repository: &dyn TelemetryRepository) -> SettledBatch {
        let FetchBatch {
            batch,
            request,
            tickets,
        } = self;

        let fetches = tickets.into_iter().map(|ticket| {
            let keys = &request.metric_keys;
            let range = request.range;
            async move {
                let result = repository.fetch_telemetry(&ticket.vehicle_id, keys, range).await;
                match &result {
                    Ok(samples) => tracing::debug!(
                        "batch {}: vehicle {} returned {} samples",
                        batch,
                        ticket.vehicle_id,
                        samples.len()
                    ),
                    Err(e) => tracing::warn!("batch {}: vehicle {} failed: {}", batch, ticket.vehicle_id, e),
                }
                VehicleResult { ticket, result }
            }
        });
        let results = join_all(fetches).await;

        SettledBatch {
            batch,
            request,
            results,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleUpdate {
    pub vehicle_id: VehicleId,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleFailure {
    pub vehicle_id: VehicleId,
    pub error: String,
}

/// What applying a settled batch did to the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchReport {
    pub batch: u64,
    pub state: LoadState,
    pub updated: Vec<VehicleUpdate>,
    pub failed: Vec<VehicleFailure>,
    /// Responses superseded by a newer fetch for the same vehicle
    pub stale: Vec<VehicleId>,
    pub evicted: Vec<VehicleId>,
    pub created_chart: Option<ChartId>,
}

impl FetchReport {
    pub fn new(batch: u64) -> Self {
        Self {
            batch,
            state: LoadState::Loading,
            updated: Vec::new(),
            failed: Vec::new(),
            stale: Vec::new(),
            evicted: Vec::new(),
            created_chart: None,
        }
    }

    pub fn failed_ids(&self) -> Vec<VehicleId> {
        self.failed.iter().map(|f| f.vehicle_id.clone()).collect()
    }
}
