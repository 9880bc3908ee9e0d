// Series builder - shapes stored telemetry into chart-ready series
use crate::application::telemetry_store::TelemetryStore;
use crate::application::vehicle_directory::VehicleDirectory;
use crate::domain::chart::{ChartId, ChartKind, ChartSpec, PieAggregation};
use crate::domain::series::{GaugeIndicator, PieSlice, SeriesData, SeriesGroup, SeriesPoint};
use crate::domain::telemetry::{TelemetrySample, VehicleId};
use std::collections::HashMap;
use std::sync::Arc;

type BuildFn = fn(&BuildContext<'_>) -> SeriesGroup;

struct BuildContext<'a> {
    spec: &'a ChartSpec,
    store: &'a TelemetryStore,
    directory: &'a VehicleDirectory,
}

struct PopulatedVehicle<'a> {
    id: &'a VehicleId,
    name: String,
    samples: &'a [TelemetrySample],
}

impl<'a> BuildContext<'a> {
    /// Selected vehicles that have at least one stored sample, in selection order.
    fn populated_vehicles(&self) -> impl Iterator<Item = PopulatedVehicle<'a>> + 'a {
        let (spec, store, directory) = (self.spec, self.store, self.directory);
        spec.vehicle_ids.iter().filter_map(move |id| {
            let samples = store.get_vehicle_series(id);
            if samples.is_empty() {
                return None;
            }
            Some(PopulatedVehicle {
                id,
                name: directory.resolve_vehicle_name(id),
                samples,
            })
        })
    }
}

fn builder_for(kind: ChartKind) -> BuildFn {
    match kind {
        ChartKind::Line | ChartKind::Area | ChartKind::Bar => build_cartesian,
        ChartKind::Scatter3d => build_scatter3d,
        ChartKind::Pie => build_pie,
        ChartKind::Gauge => build_gauge,
    }
}

/// Derive the series group for `spec` from the store. Pure: identical inputs
/// give identical output, and vehicles or metrics without data are skipped
/// rather than reported.
pub fn build(spec: &ChartSpec, store: &TelemetryStore, directory: &VehicleDirectory) -> SeriesGroup {
    let ctx = BuildContext {
        spec,
        store,
        directory,
    };
    builder_for(spec.kind)(&ctx)
}

fn build_cartesian(ctx: &BuildContext<'_>) -> SeriesGroup {
    SeriesGroup::Cartesian {
        kind: ctx.spec.kind,
        series: cartesian_series(ctx, ctx.spec.style.is_3d),
    }
}

fn build_scatter3d(ctx: &BuildContext<'_>) -> SeriesGroup {
    SeriesGroup::Cartesian {
        kind: ChartKind::Scatter3d,
        series: cartesian_series(ctx, true),
    }
}

/// One series per (vehicle, metric) pair with data, vehicle-major.
fn cartesian_series(ctx: &BuildContext<'_>, with_depth: bool) -> Vec<SeriesData> {
    let mut series: Vec<SeriesData> = Vec::new();

    for vehicle in ctx.populated_vehicles() {
        for key in &ctx.spec.metric_keys {
            let ordinal = series.len();
            let points: Vec<SeriesPoint> = vehicle
                .samples
                .iter()
                .filter_map(|s| s.metric(key).map(|v| SeriesPoint::new(s.time_ms(), v)))
                .map(|p| if with_depth { p.with_depth(ordinal as f64) } else { p })
                .collect();

            if points.is_empty() {
                continue;
            }

            series.push(SeriesData {
                vehicle_id: vehicle.id.clone(),
                metric_key: key.clone(),
                name: format!("{} ({})", vehicle.name, key),
                color: ctx.spec.style.color_at(ordinal),
                points,
            });
        }
    }

    series
}

fn build_pie(ctx: &BuildContext<'_>) -> SeriesGroup {
    let keys = &ctx.spec.metric_keys;
    let slices = ctx
        .populated_vehicles()
        .enumerate()
        .map(|(index, vehicle)| {
            let (sum, count) = vehicle
                .samples
                .iter()
                .flat_map(|s| keys.iter().filter_map(move |k| s.metric(k)))
                .fold((0.0_f64, 0_usize), |(sum, count), v| (sum + v, count + 1));

            let value = match ctx.spec.aggregation {
                PieAggregation::Sum => sum,
                PieAggregation::Average if count == 0 => 0.0,
                PieAggregation::Average => sum / count as f64,
            };

            PieSlice {
                vehicle_id: vehicle.id.clone(),
                name: vehicle.name,
                value,
                color: ctx.spec.style.color_at(index),
            }
        })
        .collect();

    SeriesGroup::Pie { slices }
}

fn build_gauge(ctx: &BuildContext<'_>) -> SeriesGroup {
    let mut indicators: Vec<GaugeIndicator> = Vec::new();

    for vehicle in ctx.populated_vehicles() {
        let Some(last) = vehicle.samples.last() else {
            continue;
        };
        for key in &ctx.spec.metric_keys {
            indicators.push(GaugeIndicator {
                vehicle_id: vehicle.id.clone(),
                metric_key: key.clone(),
                name: format!("{} ({})", vehicle.name, key),
                value: last.metric(key).unwrap_or(0.0),
                color: ctx.spec.style.color_at(indicators.len()),
            });
        }
    }

    SeriesGroup::Gauge { indicators }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    revision: u64,
    vehicle_versions: Vec<u64>,
}

impl CacheKey {
    fn of(spec: &ChartSpec, store: &TelemetryStore) -> Self {
        Self {
            revision: spec.revision,
            vehicle_versions: spec.vehicle_ids.iter().map(|id| store.version_of(id)).collect(),
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    key: CacheKey,
    group: Arc<SeriesGroup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Memoizes `build` per chart. An entry is reused while the spec revision and
/// the store versions of the spec's vehicles are unchanged.
#[derive(Debug, Default)]
pub struct SeriesCache {
    entries: HashMap<ChartId, CacheEntry>,
    hits: u64,
    misses: u64,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(
        &mut self,
        spec: &ChartSpec,
        store: &TelemetryStore,
        directory: &VehicleDirectory,
    ) -> Arc<SeriesGroup> {
        let key = CacheKey::of(spec, store);
        if let Some(entry) = self.entries.get(&spec.id) {
            if entry.key == key {
                self.hits += 1;
                tracing::trace!("series cache hit for {}", spec.id);
                return entry.group.clone();
            }
        }

        self.misses += 1;
        tracing::debug!("rebuilding series for {} ({})", spec.id, spec.kind.as_str());
        let group = Arc::new(build(spec, store, directory));
        self.entries.insert(
            spec.id.clone(),
            CacheEntry {
                key,
                group: group.clone(),
            },
        );
        group
    }

    pub fn invalidate(&mut self, id: &ChartId) {
        self.entries.remove(id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}
