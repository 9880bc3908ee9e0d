// Dashboard domain model
use super::chart::{ChartId, ChartKind, ChartSpec, LayoutRect, StyleConfig};
use super::series::SeriesGroup;
use super::telemetry::{DateRange, TelemetrySample, VehicleId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    PartiallyFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelState {
    Hidden,
    Grid,
    Fullscreen,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelView {
    pub id: ChartId,
    pub title: String,
    pub kind: ChartKind,
    pub state: PanelState,
    pub layout: LayoutRect,
    pub style: StyleConfig,
    pub vehicle_count: usize,
    pub metric_count: usize,
    pub point_count: usize,
    pub no_data: bool,
    /// Not built for hidden panels.
    pub series: Option<SeriesGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub load_state: LoadState,
    pub edit_mode: bool,
    pub fullscreen: Option<ChartId>,
    pub failed_vehicles: Vec<VehicleId>,
    pub panels: Vec<PanelView>,
}

impl DashboardView {
    pub fn panel(&self, id: &ChartId) -> Option<&PanelView> {
        self.panels.iter().find(|p| &p.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMeta {
    pub exported_at: DateTime<Utc>,
    pub vehicles: Vec<String>,
    pub range: Option<DateRange>,
    pub metrics: Vec<String>,
}

/// Snapshot of the session for download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardExport {
    pub meta: ExportMeta,
    pub charts: Vec<ChartSpec>,
    pub data: BTreeMap<VehicleId, Vec<TelemetrySample>>,
}
