// Dashboard controller - coordinates fetches against the shared session
use crate::application::dashboard_session::{DashboardSession, SessionSettings};
use crate::application::fetch_batch::{FetchReport, FetchRequest};
use crate::application::telemetry_repository::TelemetryRepository;
use crate::application::vehicle_directory::VehicleDirectory;
use crate::domain::error::{FetchError, ValidationError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

/// Cheap to clone; every clone drives the same session.
///
/// The session lock is only held for synchronous work. Fetches run unlocked,
/// so layout and chart edits stay responsive while a batch is in flight.
#[derive(Clone)]
pub struct DashboardController {
    repository: Arc<dyn TelemetryRepository>,
    session: Arc<Mutex<DashboardSession>>,
    generation: Arc<watch::Sender<u64>>,
}

impl DashboardController {
    pub fn new(repository: Arc<dyn TelemetryRepository>, settings: SessionSettings) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            repository,
            session: Arc::new(Mutex::new(DashboardSession::new(settings))),
            generation: Arc::new(generation),
        }
    }

    /// Reload the vehicle listing. On failure the previous directory is kept.
    pub async fn load_vehicles(&self) -> Result<usize, FetchError> {
        let vehicles = self.repository.list_vehicles().await?;
        let count = vehicles.len();
        self.mutate(|session| session.set_directory(VehicleDirectory::new(vehicles)))
            .await;
        tracing::info!("loaded {} vehicles", count);
        Ok(count)
    }

    /// Fetch every selected vehicle concurrently and apply the results as one
    /// batch once all of them have settled.
    pub async fn fetch(&self, request: FetchRequest) -> Result<FetchReport, ValidationError> {
        // A rejected request changes nothing, so only a valid one is announced
        let batch = self.read(|session| session.begin_fetch(request)).await?;
        self.notify();
        tracing::debug!(
            "batch {}: fetching {} vehicles",
            batch.batch,
            batch.tickets.len()
        );

        let settled = batch.run(self.repository.as_ref()).await;
        Ok(self.mutate(|session| session.apply_batch(settled)).await)
    }

    /// Re-run the last fetch with its window slid to end at `now`.
    /// Returns `None` when nothing has been fetched yet.
    pub async fn refresh(&self, now: DateTime<Utc>) -> Result<Option<FetchReport>, ValidationError> {
        let last = self.read(|session| session.last_request().cloned()).await;
        let Some(mut request) = last else {
            return Ok(None);
        };
        request.range = request.range.slide_to(now);
        self.fetch(request).await.map(Some)
    }

    /// Run `f` against the session without announcing a change.
    pub async fn read<R>(&self, f: impl FnOnce(&mut DashboardSession) -> R) -> R {
        let mut session = self.session.lock().await;
        f(&mut session)
    }

    /// Run `f` against the session and notify subscribers afterwards.
    pub async fn mutate<R>(&self, f: impl FnOnce(&mut DashboardSession) -> R) -> R {
        let result = {
            let mut session = self.session.lock().await;
            f(&mut session)
        };
        self.notify();
        result
    }

    fn notify(&self) {
        self.generation.send_modify(|g| *g += 1);
    }

    /// Receiver that ticks after every session change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }
}
