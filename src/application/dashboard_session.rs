// Dashboard session - the synchronous state the controller coordinates
use crate::application::chart_registry::ChartSpecRegistry;
use crate::application::fetch_batch::{
    FetchBatch, FetchReport, FetchRequest, FetchSequencer, SettledBatch, VehicleFailure, VehicleUpdate,
};
use crate::application::layout_manager::{LayoutManager, LayoutOutcome};
use crate::application::renderer::{PanelRenderer, Viewport};
use crate::application::series_builder::SeriesCache;
use crate::application::telemetry_store::TelemetryStore;
use crate::application::vehicle_directory::VehicleDirectory;
use crate::domain::chart::{ChartDraft, ChartId, ChartPatch, ChartSpec, LayoutProposal, StyleConfig};
use crate::domain::dashboard::{DashboardExport, DashboardView, ExportMeta, LoadState, PanelState, PanelView};
use crate::domain::error::{DashboardError, ValidationError};
use crate::domain::telemetry::VehicleId;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub grid_cols: u32,
    pub default_style: StyleConfig,
    pub auto_create_chart: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            grid_cols: crate::application::chart_registry::DEFAULT_GRID_COLS,
            default_style: StyleConfig::default(),
            auto_create_chart: true,
        }
    }
}

/// Store, registry and layout for one operator session. Every method is
/// synchronous; the controller never holds the session across a network call.
#[derive(Debug)]
pub struct DashboardSession {
    store: TelemetryStore,
    registry: ChartSpecRegistry,
    layout: LayoutManager,
    cache: SeriesCache,
    directory: VehicleDirectory,
    sequencer: FetchSequencer,
    load_state: LoadState,
    failed_vehicles: Vec<VehicleId>,
    last_request: Option<FetchRequest>,
    auto_create_chart: bool,
}

impl Default for DashboardSession {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

impl DashboardSession {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            store: TelemetryStore::new(),
            registry: ChartSpecRegistry::new(settings.grid_cols, settings.default_style),
            layout: LayoutManager::new(),
            cache: SeriesCache::new(),
            directory: VehicleDirectory::default(),
            sequencer: FetchSequencer::default(),
            load_state: LoadState::Idle,
            failed_vehicles: Vec::new(),
            last_request: None,
            auto_create_chart: settings.auto_create_chart,
        }
    }

    pub fn store(&self) -> &TelemetryStore {
        &self.store
    }

    pub fn registry(&self) -> &ChartSpecRegistry {
        &self.registry
    }

    pub fn layout(&self) -> &LayoutManager {
        &self.layout
    }

    pub fn directory(&self) -> &VehicleDirectory {
        &self.directory
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn failed_vehicles(&self) -> &[VehicleId] {
        &self.failed_vehicles
    }

    pub fn last_request(&self) -> Option<&FetchRequest> {
        self.last_request.as_ref()
    }

    /// Labels change, so every cached series is dropped.
    pub fn set_directory(&mut self, directory: VehicleDirectory) {
        self.directory = directory;
        self.cache.clear();
    }

    // Fetch lifecycle

    /// Validate and issue tickets for a batch. Moves the session to `Loading`.
    pub fn begin_fetch(&mut self, request: FetchRequest) -> Result<FetchBatch, ValidationError> {
        let request = request.normalized()?;
        self.last_request = Some(request.clone());
        self.load_state = LoadState::Loading;
        Ok(self.sequencer.issue(request))
    }

    /// Apply every result of a settled batch in one step. Superseded results
    /// are dropped; failed vehicles keep whatever was stored before.
    pub fn apply_batch(&mut self, settled: SettledBatch) -> FetchReport {
        let mut report = FetchReport::new(settled.batch);

        for vehicle in settled.results {
            let id = vehicle.ticket.vehicle_id.clone();
            if !self.sequencer.is_latest(&vehicle.ticket) {
                tracing::warn!("batch {}: dropping superseded response for {}", settled.batch, id);
                report.stale.push(id);
                continue;
            }
            match vehicle.result {
                Ok(samples) => {
                    report.updated.push(VehicleUpdate {
                        vehicle_id: id.clone(),
                        samples: samples.len(),
                    });
                    self.store.set_vehicle_series(id, samples);
                }
                Err(e) => report.failed.push(VehicleFailure {
                    vehicle_id: id,
                    error: e.to_string(),
                }),
            }
        }

        if self.sequencer.is_latest_batch(settled.batch) {
            report.evicted = self.evict_deselected(&settled.request.vehicle_ids);
            self.failed_vehicles = report.failed_ids();
            self.load_state = if report.failed.is_empty() {
                LoadState::Ready
            } else {
                LoadState::PartiallyFailed
            };
            report.created_chart = self.auto_create(&settled.request, &report);
        }

        report.state = self.load_state;
        tracing::info!(
            "batch {} applied: {} updated, {} failed, {} stale ({:?})",
            report.batch,
            report.updated.len(),
            report.failed.len(),
            report.stale.len(),
            report.state
        );
        report
    }

    fn evict_deselected(&mut self, selection: &[VehicleId]) -> Vec<VehicleId> {
        let evicted: Vec<VehicleId> = self
            .store
            .vehicles()
            .into_iter()
            .filter(|id| !selection.contains(id))
            .collect();
        for id in &evicted {
            self.store.remove(id);
        }
        evicted
    }

    fn auto_create(&mut self, request: &FetchRequest, report: &FetchReport) -> Option<ChartId> {
        if !self.auto_create_chart || !self.registry.is_empty() || report.updated.is_empty() {
            return None;
        }
        let draft = ChartDraft::new(request.vehicle_ids.clone(), request.metric_keys.clone())
            .title(format!("Analysis of {} vehicles", request.vehicle_ids.len()));
        match self.registry.create(draft) {
            Ok(spec) => Some(spec.id),
            Err(e) => {
                tracing::debug!("no automatic chart: {}", e);
                None
            }
        }
    }

    // Chart operations

    pub fn add_chart(&mut self, draft: ChartDraft) -> Result<ChartSpec, DashboardError> {
        Ok(self.registry.create(draft)?)
    }

    /// Edit a chart. A `layout` in the patch is a proposal like any other and
    /// only moves the panel when the layout gate allows it.
    pub fn update_chart(&mut self, id: &ChartId, mut patch: ChartPatch) -> Result<ChartSpec, DashboardError> {
        let proposed = patch.layout.take();
        let spec = self.registry.update(id, patch)?;
        self.cache.invalidate(id);
        if !spec.visible {
            self.layout.forget(id);
        }
        if let Some(rect) = proposed {
            let outcome = self.layout.propose(&mut self.registry, id, rect.into());
            if !outcome.is_applied() {
                tracing::debug!("layout patch for {} not applied: {:?}", id, outcome);
            }
        }
        Ok(self.registry.get(id).cloned().unwrap_or(spec))
    }

    pub fn remove_chart(&mut self, id: &ChartId) -> Result<ChartSpec, DashboardError> {
        let spec = self.registry.remove(id)?;
        self.cache.invalidate(id);
        self.layout.forget(id);
        Ok(spec)
    }

    pub fn duplicate_chart(&mut self, id: &ChartId) -> Result<ChartSpec, DashboardError> {
        self.registry.duplicate(id)
    }

    // Layout operations

    pub fn set_edit_mode(&mut self, enabled: bool) {
        self.layout.set_edit_mode(enabled);
    }

    pub fn propose_layout(&mut self, id: &ChartId, proposal: LayoutProposal) -> LayoutOutcome {
        let outcome = self.layout.propose(&mut self.registry, id, proposal);
        if outcome.is_applied() {
            self.cache.invalidate(id);
        }
        outcome
    }

    pub fn toggle_visible(&mut self, id: &ChartId) -> LayoutOutcome {
        let outcome = self.layout.toggle_visible(&mut self.registry, id);
        if outcome.is_applied() {
            self.cache.invalidate(id);
        }
        outcome
    }

    pub fn show_all(&mut self) -> usize {
        self.layout.show_all(&mut self.registry)
    }

    pub fn enter_fullscreen(&mut self, id: &ChartId) -> LayoutOutcome {
        self.layout.enter_fullscreen(&self.registry, id)
    }

    pub fn exit_fullscreen(&mut self) -> Option<LayoutOutcome> {
        self.layout.exit_fullscreen(&self.registry)
    }

    // Views

    pub fn view(&mut self) -> DashboardView {
        let mut panels = Vec::with_capacity(self.registry.len());
        for spec in self.registry.list() {
            let state = self.layout.panel_state(spec);
            let series = match state {
                PanelState::Hidden => None,
                _ => Some(self.cache.get_or_build(spec, &self.store, &self.directory)),
            };
            panels.push(PanelView {
                id: spec.id.clone(),
                title: spec.title.clone(),
                kind: spec.kind,
                state,
                layout: spec.layout,
                style: spec.style.clone(),
                vehicle_count: spec.vehicle_ids.len(),
                metric_count: spec.metric_keys.len(),
                point_count: series.as_ref().map(|g| g.point_count()).unwrap_or(0),
                no_data: series.as_ref().map(|g| g.is_empty()).unwrap_or(false),
                series: series.map(|g| g.as_ref().clone()),
            });
        }

        DashboardView {
            load_state: self.load_state,
            edit_mode: self.layout.edit_mode(),
            fullscreen: self.layout.fullscreen().cloned(),
            failed_vehicles: self.failed_vehicles.clone(),
            panels,
        }
    }

    /// Push every on-screen panel through the renderer: only the focused panel
    /// while one is fullscreen, otherwise every visible panel. Returns the
    /// number of panels rendered.
    pub fn render_panels(&mut self, renderer: &dyn PanelRenderer) -> usize {
        let focused = self.layout.fullscreen().cloned();
        let mut rendered = 0;
        for spec in self.registry.list() {
            let on_screen = match &focused {
                Some(id) => &spec.id == id,
                None => spec.visible,
            };
            if !on_screen {
                continue;
            }
            let group = self.cache.get_or_build(spec, &self.store, &self.directory);
            let viewport = Viewport {
                chart_id: spec.id.clone(),
                title: spec.title.clone(),
                rect: spec.layout,
                fullscreen: focused.is_some(),
            };
            renderer.render(&group, &spec.style, &viewport);
            rendered += 1;
        }
        rendered
    }

    pub fn export(&self, now: DateTime<Utc>) -> DashboardExport {
        let (vehicles, range, metrics) = match &self.last_request {
            Some(request) => (
                request
                    .vehicle_ids
                    .iter()
                    .map(|id| self.directory.resolve_vehicle_name(id))
                    .collect(),
                Some(request.range),
                request.metric_keys.clone(),
            ),
            None => (Vec::new(), None, Vec::new()),
        };

        DashboardExport {
            meta: ExportMeta {
                exported_at: now,
                vehicles,
                range,
                metrics,
            },
            charts: self.registry.list().to_vec(),
            data: self.store.snapshot(),
        }
    }

    /// Remove every chart and all telemetry; the selection is kept for refresh.
    pub fn clear_all(&mut self) {
        self.registry.clear();
        self.store.clear();
        self.cache.clear();
        self.sequencer.forget_all();
        self.layout.exit_fullscreen(&self.registry);
        self.failed_vehicles.clear();
        self.load_state = LoadState::Idle;
    }

    /// Drop everything tied to the operator's session.
    pub fn logout(&mut self) {
        self.clear_all();
        self.layout = LayoutManager::new();
        self.last_request = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fetch_batch::VehicleResult;
    use crate::application::test_support::{hourly, keys, range, vid, FakeRepository};
    use crate::domain::chart::{ChartKind, LayoutRect};
    use crate::domain::error::FetchError;
    use crate::domain::series::SeriesGroup;
    use crate::domain::vehicle::Vehicle;
    use std::sync::Mutex;

    fn request(ids: &[&str]) -> FetchRequest {
        FetchRequest::new(ids.iter().map(|id| vid(id)).collect(), keys(&["f"]), range())
    }

    fn manual_session() -> DashboardSession {
        DashboardSession::new(SessionSettings {
            auto_create_chart: false,
            ..SessionSettings::default()
        })
    }

    fn settle(batch: FetchBatch, answers: Vec<Result<usize, FetchError>>) -> SettledBatch {
        let results = batch
            .tickets
            .into_iter()
            .zip(answers)
            .map(|(ticket, answer)| VehicleResult {
                ticket,
                result: answer.map(|n| hourly("f", n)),
            })
            .collect();
        SettledBatch {
            batch: batch.batch,
            request: batch.request,
            results,
        }
    }

    #[test]
    fn test_empty_selection_rejected_before_any_state_change() {
        let mut session = manual_session();
        let err = session.begin_fetch(request(&[])).unwrap_err();
        assert_eq!(err, ValidationError::EmptyVehicleSelection);
        assert_eq!(session.load_state(), LoadState::Idle);
        assert!(session.last_request().is_none());
    }

    #[test]
    fn test_partial_failure_keeps_prior_data() {
        let mut session = manual_session();
        let batch = session.begin_fetch(request(&["A", "B"])).unwrap();
        session.apply_batch(settle(batch, vec![Ok(3), Ok(7)]));

        let batch = session.begin_fetch(request(&["A", "B"])).unwrap();
        assert_eq!(session.load_state(), LoadState::Loading);
        let report = session.apply_batch(settle(
            batch,
            vec![Ok(10), Err(FetchError::Transport("timeout".to_string()))],
        ));

        assert_eq!(report.state, LoadState::PartiallyFailed);
        assert_eq!(session.store().sample_count(&vid("A")), 10);
        assert_eq!(session.store().sample_count(&vid("B")), 7);
        assert_eq!(session.failed_vehicles(), &[vid("B")]);
    }

    #[test]
    fn test_first_failure_leaves_vehicle_empty() {
        let mut session = manual_session();
        let batch = session.begin_fetch(request(&["A", "B"])).unwrap();
        let report = session.apply_batch(settle(
            batch,
            vec![Ok(10), Err(FetchError::Backend { status: 502, message: "bad gateway".to_string() })],
        ));

        assert_eq!(report.state, LoadState::PartiallyFailed);
        assert_eq!(report.failed[0].error, "backend returned status 502: bad gateway");
        assert_eq!(session.store().sample_count(&vid("A")), 10);
        assert!(!session.store().contains(&vid("B")));
    }

    #[test]
    fn test_stale_response_never_overwrites_fresher_one() {
        let mut session = manual_session();
        let slow = session.begin_fetch(request(&["A", "B"])).unwrap();
        let fast = session.begin_fetch(request(&["A", "B"])).unwrap();

        let report = session.apply_batch(settle(fast, vec![Ok(12), Ok(12)]));
        assert_eq!(report.state, LoadState::Ready);

        let report = session.apply_batch(settle(slow, vec![Ok(2), Ok(2)]));
        assert_eq!(report.stale, vec![vid("A"), vid("B")]);
        assert!(report.updated.is_empty());
        assert_eq!(report.state, LoadState::Ready);
        assert_eq!(session.store().sample_count(&vid("A")), 12);
    }

    #[test]
    fn test_older_batch_cannot_restore_deselected_vehicle() {
        let mut session = manual_session();
        let batch = session.begin_fetch(request(&["A", "B"])).unwrap();
        session.apply_batch(settle(batch, vec![Ok(1), Ok(1)]));

        let older = session.begin_fetch(request(&["A", "B"])).unwrap();
        let newer = session.begin_fetch(request(&["A"])).unwrap();

        // Newer batch lands first and drops B from the selection
        let report = session.apply_batch(settle(newer, vec![Ok(6)]));
        assert_eq!(report.evicted, vec![vid("B")]);
        assert_eq!(report.state, LoadState::Ready);

        let report = session.apply_batch(settle(older, vec![Ok(4), Ok(5)]));
        assert_eq!(report.stale, vec![vid("A"), vid("B")]);
        assert!(report.updated.is_empty());
        assert_eq!(session.store().vehicles(), vec![vid("A")]);
        assert_eq!(session.store().sample_count(&vid("A")), 6);
    }

    #[test]
    fn test_older_batch_landing_first_skips_deselected_vehicle() {
        let mut session = manual_session();
        let older = session.begin_fetch(request(&["A", "B"])).unwrap();
        let newer = session.begin_fetch(request(&["A"])).unwrap();

        let report = session.apply_batch(settle(older, vec![Ok(4), Ok(5)]));
        assert_eq!(report.stale, vec![vid("A"), vid("B")]);
        assert!(!session.store().contains(&vid("B")));
        assert_eq!(report.state, LoadState::Loading);

        let report = session.apply_batch(settle(newer, vec![Ok(6)]));
        assert!(report.evicted.is_empty());
        assert_eq!(session.store().vehicles(), vec![vid("A")]);
        assert_eq!(session.load_state(), LoadState::Ready);
    }

    #[test]
    fn test_auto_creates_first_chart_only() {
        let mut session = DashboardSession::default();
        let batch = session.begin_fetch(request(&["A", "B"])).unwrap();
        let report = session.apply_batch(settle(batch, vec![Ok(24), Ok(24)]));

        let id = report.created_chart.expect("first batch creates a chart");
        let spec = session.registry().get(&id).unwrap();
        assert_eq!(spec.title, "Analysis of 2 vehicles");
        assert_eq!(spec.kind, ChartKind::Line);

        let batch = session.begin_fetch(request(&["A"])).unwrap();
        let report = session.apply_batch(settle(batch, vec![Ok(1)]));
        assert!(report.created_chart.is_none());
        assert_eq!(session.registry().len(), 1);
    }

    #[test]
    fn test_view_builds_visible_panels_and_flags_no_data() {
        let mut session = manual_session();
        session.set_directory(VehicleDirectory::new(vec![
            Vehicle::new(vid("A"), "A"),
            Vehicle::new(vid("B"), "B"),
        ]));
        let batch = session.begin_fetch(request(&["A", "B"])).unwrap();
        session.apply_batch(settle(batch, vec![Ok(24), Ok(24)]));

        let line = session
            .add_chart(ChartDraft::new(vec![vid("A"), vid("B")], keys(&["f"])))
            .unwrap();
        let empty = session
            .add_chart(ChartDraft::new(vec![vid("A")], keys(&["temp"])))
            .unwrap();
        let hidden = session
            .add_chart(ChartDraft::new(vec![vid("A")], keys(&["f"])))
            .unwrap();
        session.toggle_visible(&hidden.id);

        let view = session.view();
        let panel = view.panel(&line.id).unwrap();
        assert_eq!(panel.point_count, 48);
        assert!(!panel.no_data);
        let Some(SeriesGroup::Cartesian { series, .. }) = &panel.series else {
            panic!("line panel should carry cartesian series");
        };
        assert_eq!(series[0].name, "A (f)");
        assert_eq!(series[1].name, "B (f)");

        assert!(view.panel(&empty.id).unwrap().no_data);
        let hidden_panel = view.panel(&hidden.id).unwrap();
        assert_eq!(hidden_panel.state, PanelState::Hidden);
        assert!(hidden_panel.series.is_none());
    }

    #[test]
    fn test_chart_edits_invalidate_cached_series() {
        let mut session = manual_session();
        let batch = session.begin_fetch(request(&["A"])).unwrap();
        session.apply_batch(settle(batch, vec![Ok(5)]));
        let spec = session
            .add_chart(ChartDraft::new(vec![vid("A")], keys(&["f"])))
            .unwrap();

        session.view();
        session.view();
        assert_eq!(session.cache().stats().hits, 1);

        session
            .update_chart(&spec.id, ChartPatch { kind: Some(ChartKind::Pie), ..ChartPatch::default() })
            .unwrap();
        let view = session.view();
        assert!(matches!(view.panels[0].series, Some(SeriesGroup::Pie { .. })));
        assert_eq!(session.cache().stats().misses, 2);
    }

    #[test]
    fn test_patched_layout_goes_through_edit_gate() {
        let mut session = manual_session();
        let spec = session
            .add_chart(ChartDraft::new(vec![vid("A")], keys(&["f"])))
            .unwrap();
        let moved = ChartPatch {
            title: Some("Fuel".to_string()),
            layout: Some(LayoutRect::at(7, 9)),
            ..ChartPatch::default()
        };

        let updated = session.update_chart(&spec.id, moved.clone()).unwrap();
        assert_eq!(updated.title, "Fuel");
        assert_eq!(updated.layout, spec.layout);
        assert_eq!(session.registry().get(&spec.id).unwrap().layout, spec.layout);

        session.set_edit_mode(true);
        session.enter_fullscreen(&spec.id);
        let updated = session.update_chart(&spec.id, moved.clone()).unwrap();
        assert_eq!(updated.layout, spec.layout);

        session.exit_fullscreen();
        let updated = session.update_chart(&spec.id, moved).unwrap();
        assert_eq!((updated.layout.x, updated.layout.y), (7, 9));
        assert_eq!(session.registry().get(&spec.id), Some(&updated));
    }

    #[test]
    fn test_chart_added_after_far_drag_gets_a_grid_slot() {
        let mut session = manual_session();
        let dragged = session
            .add_chart(ChartDraft::new(vec![vid("A")], keys(&["f"])))
            .unwrap();
        session.set_edit_mode(true);
        let outcome = session.propose_layout(&dragged.id, LayoutProposal { x: 0, y: i64::MAX, w: 4, h: 3 });
        let LayoutOutcome::Applied { layout, .. } = outcome else {
            panic!("drag should apply in edit mode");
        };
        assert_eq!(layout.bottom(), u32::MAX);

        let next = session
            .add_chart(ChartDraft::new(vec![vid("A")], keys(&["f"])))
            .unwrap();
        assert_eq!((next.layout.x, next.layout.y), (0, 0));
    }

    #[test]
    fn test_removing_fullscreen_chart_clears_focus() {
        let mut session = manual_session();
        let spec = session
            .add_chart(ChartDraft::new(vec![vid("A")], keys(&["f"])))
            .unwrap();
        session.enter_fullscreen(&spec.id);
        session.remove_chart(&spec.id).unwrap();

        assert_eq!(session.layout().fullscreen(), None);
        assert!(session.remove_chart(&spec.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_duplicate_scenario() {
        let mut session = manual_session();
        let spec = session
            .add_chart(ChartDraft::new(vec![vid("A")], keys(&["f"])).layout(LayoutRect::at(0, 0)))
            .unwrap();
        let copy = session.duplicate_chart(&spec.id).unwrap();
        assert_ne!(copy.id, spec.id);
        assert_eq!((copy.layout.x, copy.layout.y, copy.layout.w, copy.layout.h), (1, 1, 4, 3));
    }

    struct RecordingRenderer {
        frames: Mutex<Vec<(ChartId, bool)>>,
    }

    impl PanelRenderer for RecordingRenderer {
        fn render(&self, _group: &SeriesGroup, _style: &StyleConfig, viewport: &Viewport) {
            self.frames
                .lock()
                .unwrap()
                .push((viewport.chart_id.clone(), viewport.fullscreen));
        }
    }

    #[test]
    fn test_render_panels_respects_visibility_and_focus() {
        let mut session = manual_session();
        let ids: Vec<ChartId> = (0..3)
            .map(|_| {
                session
                    .add_chart(ChartDraft::new(vec![vid("A")], keys(&["f"])))
                    .unwrap()
                    .id
            })
            .collect();
        session.toggle_visible(&ids[2]);

        let renderer = RecordingRenderer { frames: Mutex::new(Vec::new()) };
        assert_eq!(session.render_panels(&renderer), 2);

        session.enter_fullscreen(&ids[1]);
        assert_eq!(session.render_panels(&renderer), 1);
        let frames = renderer.frames.lock().unwrap();
        assert_eq!(frames.last(), Some(&(ids[1].clone(), true)));
    }

    #[tokio::test]
    async fn test_export_and_logout() {
        let repo = FakeRepository::new(&[("A", "Grader")]);
        repo.answer("A", hourly("f", 3));

        let mut session = manual_session();
        session.set_directory(VehicleDirectory::new(repo_vehicles(&repo).await));
        let batch = session.begin_fetch(request(&["A"])).unwrap();
        let settled = batch.run(&repo).await;
        session.apply_batch(settled);
        session.add_chart(ChartDraft::new(vec![vid("A")], keys(&["f"]))).unwrap();

        let export = session.export(Utc::now());
        assert_eq!(export.meta.vehicles, vec!["Grader"]);
        assert_eq!(export.meta.metrics, keys(&["f"]));
        assert_eq!(export.charts.len(), 1);
        assert_eq!(export.data[&vid("A")].len(), 3);

        session.set_edit_mode(true);
        session.logout();
        assert!(session.registry().is_empty());
        assert!(session.store().vehicles().is_empty());
        assert!(!session.layout().edit_mode());
        assert_eq!(session.load_state(), LoadState::Idle);
        assert!(session.export(Utc::now()).meta.range.is_none());
    }

    async fn repo_vehicles(repo: &FakeRepository) -> Vec<Vehicle> {
        use crate::application::telemetry_repository::TelemetryRepository;
        repo.list_vehicles().await.unwrap()
    }
}
