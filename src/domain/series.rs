// Chart-ready series structures produced by the series builder
use super::chart::ChartKind;
use super::telemetry::VehicleId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub time_ms: i64,
    pub value: f64,
    /// Synthetic depth for 3D variants. Presentation only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl SeriesPoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self {
            time_ms,
            value,
            z: None,
        }
    }

    pub fn with_depth(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesData {
    pub vehicle_id: VehicleId,
    pub metric_key: String,
    pub name: String,
    pub color: Option<String>,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub vehicle_id: VehicleId,
    pub name: String,
    pub value: f64,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeIndicator {
    pub vehicle_id: VehicleId,
    pub metric_key: String,
    pub name: String,
    pub value: f64,
    pub color: Option<String>,
}

/// Builder output, one shape per family of chart kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SeriesGroup {
    Cartesian {
        kind: ChartKind,
        series: Vec<SeriesData>,
    },
    Pie {
        slices: Vec<PieSlice>,
    },
    Gauge {
        indicators: Vec<GaugeIndicator>,
    },
}

impl SeriesGroup {
    /// An empty group is a valid result; renderers show a "no data" state.
    pub fn is_empty(&self) -> bool {
        match self {
            SeriesGroup::Cartesian { series, .. } => series.is_empty(),
            SeriesGroup::Pie { slices } => slices.is_empty(),
            SeriesGroup::Gauge { indicators } => indicators.is_empty(),
        }
    }

    pub fn point_count(&self) -> usize {
        match self {
            SeriesGroup::Cartesian { series, .. } => series.iter().map(|s| s.points.len()).sum(),
            SeriesGroup::Pie { slices } => slices.len(),
            SeriesGroup::Gauge { indicators } => indicators.len(),
        }
    }

    /// Copy with every synthetic depth coordinate dropped, for comparisons that
    /// must ignore presentation-only data.
    pub fn without_depth(&self) -> SeriesGroup {
        match self {
            SeriesGroup::Cartesian { kind, series } => SeriesGroup::Cartesian {
                kind: *kind,
                series: series
                    .iter()
                    .map(|s| SeriesData {
                        points: s
                            .points
                            .iter()
                            .map(|p| SeriesPoint::new(p.time_ms, p.value))
                            .collect(),
                        ..s.clone()
                    })
                    .collect(),
            },
            other => other.clone(),
        }
    }
}
