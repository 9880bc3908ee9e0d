// Chart spec domain models
use super::telemetry::VehicleId;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_PANEL_W: u32 = 4;
pub const DEFAULT_PANEL_H: u32 = 3;
pub const DEFAULT_MIN_W: u32 = 2;
pub const DEFAULT_MIN_H: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartId(String);

impl ChartId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Line,
    Area,
    Bar,
    Pie,
    Gauge,
    Scatter3d,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Area => "area",
            ChartKind::Bar => "bar",
            ChartKind::Pie => "pie",
            ChartKind::Gauge => "gauge",
            ChartKind::Scatter3d => "scatter3d",
        }
    }
}

/// How a pie slice folds a vehicle's values into one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieAggregation {
    #[default]
    Sum,
    Average,
}

/// Presentation options. Never consulted when shaping data, except for
/// colour assignment and the synthetic 3D depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub colors: Vec<String>,
    pub line_width: u32,
    pub show_points: bool,
    pub is_3d: bool,
    pub animation: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            colors: ["#FFB800", "#ef4444", "#22c55e", "#3b82f6"]
                .map(String::from)
                .to_vec(),
            line_width: 3,
            show_points: false,
            is_3d: false,
            animation: true,
        }
    }
}

impl StyleConfig {
    pub fn normalized(mut self) -> Self {
        self.line_width = self.line_width.max(1);
        self
    }

    /// Colour for the `index`-th constructed series, cycling through the palette.
    pub fn color_at(&self, index: usize) -> Option<String> {
        if self.colors.is_empty() {
            return None;
        }
        Some(self.colors[index % self.colors.len()].clone())
    }
}

/// Panel rectangle in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub min_w: u32,
    pub min_h: u32,
}

impl Default for LayoutRect {
    fn default() -> Self {
        Self::at(0, 0)
    }
}

impl LayoutRect {
    /// Default-sized panel at the given cell.
    pub fn at(x: u32, y: u32) -> Self {
        Self {
            x,
            y,
            w: DEFAULT_PANEL_W,
            h: DEFAULT_PANEL_H,
            min_w: DEFAULT_MIN_W,
            min_h: DEFAULT_MIN_H,
        }
    }

    /// Enforce `min_w, min_h >= 1`, `w >= min_w`, `h >= min_h`, and keep the
    /// far edges `x + w`, `y + h` inside `u32`.
    pub fn normalized(self) -> Self {
        let min_w = self.min_w.max(1);
        let min_h = self.min_h.max(1);
        let w = self.w.max(min_w);
        let h = self.h.max(min_h);
        Self {
            x: self.x.min(u32::MAX - w),
            y: self.y.min(u32::MAX - h),
            w,
            h,
            min_w,
            min_h,
        }
    }

    pub fn offset(self, dx: u32, dy: u32) -> Self {
        Self {
            x: self.x.saturating_add(dx).min(u32::MAX - self.w),
            y: self.y.saturating_add(dy).min(u32::MAX - self.h),
            ..self
        }
    }

    pub fn overlaps(&self, other: &LayoutRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }

    pub fn holds_invariant(&self) -> bool {
        self.min_w >= 1 && self.min_h >= 1 && self.w >= self.min_w && self.h >= self.min_h
    }
}

/// A client-proposed rectangle. Signed so drags past the origin can be clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutProposal {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl From<LayoutRect> for LayoutProposal {
    fn from(rect: LayoutRect) -> Self {
        Self {
            x: rect.x.into(),
            y: rect.y.into(),
            w: rect.w.into(),
            h: rect.h.into(),
        }
    }
}

impl LayoutProposal {
    /// Clamp onto `current`'s minimums: `x, y >= 0`, `w >= min_w`, `h >= min_h`.
    pub fn clamp_onto(&self, current: &LayoutRect) -> LayoutRect {
        let cell = |v: i64| u32::try_from(v.max(0)).unwrap_or(u32::MAX);
        LayoutRect {
            x: cell(self.x),
            y: cell(self.y),
            w: cell(self.w),
            h: cell(self.h),
            min_w: current.min_w,
            min_h: current.min_h,
        }
        .normalized()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub id: ChartId,
    pub kind: ChartKind,
    pub title: String,
    pub vehicle_ids: Vec<VehicleId>,
    pub metric_keys: Vec<String>,
    pub style: StyleConfig,
    pub layout: LayoutRect,
    pub visible: bool,
    pub aggregation: PieAggregation,
    /// Bumped by the registry on every mutation.
    pub revision: u64,
}

impl ChartSpec {
    pub fn is_renderable(&self) -> bool {
        !self.vehicle_ids.is_empty() && !self.metric_keys.is_empty()
    }
}

/// Partial spec accepted by `ChartSpecRegistry::create`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartDraft {
    pub kind: Option<ChartKind>,
    pub title: Option<String>,
    pub vehicle_ids: Vec<VehicleId>,
    pub metric_keys: Vec<String>,
    pub style: Option<StyleConfig>,
    pub layout: Option<LayoutRect>,
    pub visible: Option<bool>,
    pub aggregation: Option<PieAggregation>,
}

impl ChartDraft {
    pub fn new(vehicle_ids: Vec<VehicleId>, metric_keys: Vec<String>) -> Self {
        Self {
            vehicle_ids,
            metric_keys,
            ..Self::default()
        }
    }

    pub fn kind(mut self, kind: ChartKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn layout(mut self, layout: LayoutRect) -> Self {
        self.layout = Some(layout);
        self
    }
}

/// Partial update accepted by `ChartSpecRegistry::update`. `None` leaves a
/// field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartPatch {
    pub kind: Option<ChartKind>,
    pub title: Option<String>,
    pub vehicle_ids: Option<Vec<VehicleId>>,
    pub metric_keys: Option<Vec<String>>,
    pub style: Option<StyleConfig>,
    pub layout: Option<LayoutRect>,
    pub visible: Option<bool>,
    pub aggregation: Option<PieAggregation>,
}

impl ChartPatch {
    pub fn layout(layout: LayoutRect) -> Self {
        Self {
            layout: Some(layout),
            ..Self::default()
        }
    }

    pub fn visible(visible: bool) -> Self {
        Self {
            visible: Some(visible),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_enforces_minimums() {
        let rect = LayoutRect {
            x: 3,
            y: 1,
            w: 1,
            h: 0,
            min_w: 0,
            min_h: 2,
        }
        .normalized();
        assert_eq!((rect.w, rect.h, rect.min_w, rect.min_h), (1, 2, 1, 2));
        assert!(rect.holds_invariant());
    }

    #[test]
    fn test_proposal_clamps_negative_origin_and_small_size() {
        let current = LayoutRect::at(2, 2);
        let rect = LayoutProposal {
            x: -3,
            y: 5,
            w: 1,
            h: -4,
        }
        .clamp_onto(&current);
        assert_eq!(rect, LayoutRect { x: 0, y: 5, w: 2, h: 2, min_w: 2, min_h: 2 });
    }

    #[test]
    fn test_overlaps() {
        let a = LayoutRect::at(0, 0);
        assert!(a.overlaps(&LayoutRect::at(3, 2)));
        assert!(!a.overlaps(&LayoutRect::at(4, 0)));
        assert!(!a.overlaps(&LayoutRect::at(0, 3)));
    }

    #[test]
    fn test_proposal_far_off_grid_keeps_edges_in_range() {
        let current = LayoutRect::at(0, 0);
        let rect = LayoutProposal {
            x: i64::MAX,
            y: i64::MAX,
            w: 4,
            h: i64::MAX,
        }
        .clamp_onto(&current);
        assert_eq!(rect.right(), u32::MAX);
        assert_eq!(rect.y, 0);
        assert_eq!(rect.h, u32::MAX);

        let moved = rect.offset(1, 1);
        assert_eq!((moved.x, moved.y), (rect.x, rect.y));
        assert!(moved.overlaps(&LayoutRect::at(u32::MAX - 5, 10)));
    }

    #[test]
    fn test_color_cycles_and_tolerates_empty_palette() {
        let style = StyleConfig::default();
        assert_eq!(style.color_at(5).as_deref(), Some("#ef4444"));

        let bare = StyleConfig {
            colors: Vec::new(),
            ..StyleConfig::default()
        };
        assert_eq!(bare.color_at(0), None);
    }

    #[test]
    fn test_kind_wire_names() {
        let kind: ChartKind = serde_json::from_str("\"scatter3d\"").unwrap();
        assert_eq!(kind, ChartKind::Scatter3d);
        assert_eq!(serde_json::to_string(&ChartKind::Gauge).unwrap(), "\"gauge\"");
    }
}
