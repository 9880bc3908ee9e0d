// Chart spec registry - source of truth for which charts exist
use crate::domain::chart::{ChartDraft, ChartId, ChartPatch, ChartSpec, LayoutRect, StyleConfig};
use crate::domain::error::{DashboardError, ValidationError};
use crate::domain::telemetry::ordered_unique;

pub const DEFAULT_GRID_COLS: u32 = 12;

#[derive(Debug)]
pub struct ChartSpecRegistry {
    specs: Vec<ChartSpec>,
    next_id: u64,
    next_revision: u64,
    grid_cols: u32,
    default_style: StyleConfig,
}

impl Default for ChartSpecRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_COLS, StyleConfig::default())
    }
}

impl ChartSpecRegistry {
    pub fn new(grid_cols: u32, default_style: StyleConfig) -> Self {
        Self {
            specs: Vec::new(),
            next_id: 0,
            next_revision: 0,
            grid_cols: grid_cols.max(1),
            default_style: default_style.normalized(),
        }
    }

    /// Validate a draft and insert it. Empty vehicle or metric selections are
    /// rejected and nothing is inserted.
    pub fn create(&mut self, draft: ChartDraft) -> Result<ChartSpec, ValidationError> {
        let vehicle_ids = ordered_unique(&draft.vehicle_ids);
        let metric_keys = ordered_unique(&draft.metric_keys);
        if vehicle_ids.is_empty() {
            return Err(ValidationError::EmptyVehicleSelection);
        }
        if metric_keys.is_empty() {
            return Err(ValidationError::EmptyMetricSelection);
        }

        let id = self.allocate_id();
        let title = draft
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| format!("Chart {}", self.specs.len() + 1));
        let layout = match draft.layout {
            Some(layout) => layout.normalized(),
            None => self.next_free_slot(LayoutRect::default()),
        };

        let spec = ChartSpec {
            id,
            kind: draft.kind.unwrap_or_default(),
            title,
            vehicle_ids,
            metric_keys,
            style: draft.style.unwrap_or_else(|| self.default_style.clone()).normalized(),
            layout,
            visible: draft.visible.unwrap_or(true),
            aggregation: draft.aggregation.unwrap_or_default(),
            revision: self.bump_revision(),
        };

        tracing::debug!("created {} ({})", spec.id, spec.kind.as_str());
        self.specs.push(spec.clone());
        Ok(spec)
    }

    pub fn update(&mut self, id: &ChartId, patch: ChartPatch) -> Result<ChartSpec, DashboardError> {
        let pos = self.position(id)?;
        let revision = self.bump_revision();
        let spec = &mut self.specs[pos];

        if let Some(kind) = patch.kind {
            spec.kind = kind;
        }
        if let Some(title) = patch.title {
            spec.title = title;
        }
        if let Some(vehicle_ids) = patch.vehicle_ids {
            spec.vehicle_ids = ordered_unique(&vehicle_ids);
        }
        if let Some(metric_keys) = patch.metric_keys {
            spec.metric_keys = ordered_unique(&metric_keys);
        }
        if let Some(style) = patch.style {
            spec.style = style.normalized();
        }
        if let Some(layout) = patch.layout {
            spec.layout = layout.normalized();
        }
        if let Some(visible) = patch.visible {
            spec.visible = visible;
        }
        if let Some(aggregation) = patch.aggregation {
            spec.aggregation = aggregation;
        }
        spec.revision = revision;

        Ok(spec.clone())
    }

    pub fn remove(&mut self, id: &ChartId) -> Result<ChartSpec, DashboardError> {
        let pos = self.position(id)?;
        Ok(self.specs.remove(pos))
    }

    /// Deep copy under a new id, shifted one cell right and down.
    pub fn duplicate(&mut self, id: &ChartId) -> Result<ChartSpec, DashboardError> {
        let source = self.specs[self.position(id)?].clone();
        let copy = ChartSpec {
            id: self.allocate_id(),
            title: format!("{} (copy)", source.title),
            layout: source.layout.offset(1, 1),
            revision: self.bump_revision(),
            ..source
        };
        self.specs.push(copy.clone());
        Ok(copy)
    }

    pub fn get(&self, id: &ChartId) -> Option<&ChartSpec> {
        self.specs.iter().find(|s| &s.id == id)
    }

    /// Specs in insertion order.
    pub fn list(&self) -> &[ChartSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn clear(&mut self) {
        self.specs.clear();
    }

    pub fn grid_cols(&self) -> u32 {
        self.grid_cols
    }

    /// First cell, scanning rows top-down and columns left-right, where `size`
    /// fits inside the grid width without touching an existing panel.
    fn next_free_slot(&self, size: LayoutRect) -> LayoutRect {
        let max_x = self.grid_cols.saturating_sub(size.w);
        let bottom = self.specs.iter().map(|s| s.layout.bottom()).max().unwrap_or(0);

        for y in 0..=bottom {
            for x in 0..=max_x {
                let candidate = LayoutRect { x, y, ..size };
                if !self.specs.iter().any(|s| s.layout.overlaps(&candidate)) {
                    return candidate;
                }
            }
        }
        LayoutRect {
            x: 0,
            y: bottom.min(u32::MAX - size.h),
            ..size
        }
    }

    fn allocate_id(&mut self) -> ChartId {
        self.next_id += 1;
        ChartId::new(format!("chart-{}", self.next_id))
    }

    fn bump_revision(&mut self) -> u64 {
        self.next_revision += 1;
        self.next_revision
    }

    fn position(&self, id: &ChartId) -> Result<usize, DashboardError> {
        self.specs
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| DashboardError::ChartNotFound(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{keys, vid};
    use crate::domain::chart::{ChartKind, PieAggregation};

    fn draft() -> ChartDraft {
        ChartDraft::new(vec![vid("A"), vid("B")], keys(&["f"]))
    }

    #[test]
    fn test_create_rejects_empty_selections() {
        let mut registry = ChartSpecRegistry::default();
        registry.create(draft()).unwrap();

        let err = registry.create(ChartDraft::new(vec![], keys(&["f"]))).unwrap_err();
        assert_eq!(err, ValidationError::EmptyVehicleSelection);
        let err = registry.create(ChartDraft::new(vec![vid("A")], vec![])).unwrap_err();
        assert_eq!(err, ValidationError::EmptyMetricSelection);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_create_fills_defaults() {
        let mut registry = ChartSpecRegistry::default();
        let mut d = draft();
        d.vehicle_ids.push(vid("A"));
        let spec = registry.create(d).unwrap();

        assert_eq!(spec.id, ChartId::new("chart-1"));
        assert_eq!(spec.kind, ChartKind::Line);
        assert_eq!(spec.title, "Chart 1");
        assert_eq!(spec.vehicle_ids, vec![vid("A"), vid("B")]);
        assert_eq!(spec.layout, LayoutRect { x: 0, y: 0, w: 4, h: 3, min_w: 2, min_h: 2 });
        assert_eq!(spec.aggregation, PieAggregation::Sum);
        assert!(spec.visible);
    }

    #[test]
    fn test_default_layout_takes_next_free_slot() {
        let mut registry = ChartSpecRegistry::default();
        let slots: Vec<(u32, u32)> = (0..4)
            .map(|_| {
                let layout = registry.create(draft()).unwrap().layout;
                (layout.x, layout.y)
            })
            .collect();
        assert_eq!(slots, vec![(0, 0), (4, 0), (8, 0), (0, 3)]);

        // A freed slot is reused
        registry.remove(&ChartId::new("chart-2")).unwrap();
        assert_eq!(registry.create(draft()).unwrap().layout.x, 4);
    }

    #[test]
    fn test_duplicate_offsets_layout_and_gets_new_id() {
        let mut registry = ChartSpecRegistry::default();
        let source = registry
            .create(draft().layout(LayoutRect::at(0, 0)).title("Speed"))
            .unwrap();

        let copy = registry.duplicate(&source.id).unwrap();
        assert_ne!(copy.id, source.id);
        assert_eq!((copy.layout.x, copy.layout.y, copy.layout.w, copy.layout.h), (1, 1, 4, 3));
        assert_eq!(copy.title, "Speed (copy)");
        assert_eq!(copy.vehicle_ids, source.vehicle_ids);
        assert_eq!(registry.list().len(), 2);
        assert_eq!(registry.list()[1].id, copy.id);
    }

    #[test]
    fn test_update_bumps_revision_and_normalizes_layout() {
        let mut registry = ChartSpecRegistry::default();
        let spec = registry.create(draft()).unwrap();

        let mut small = spec.layout;
        small.w = 1;
        let updated = registry
            .update(
                &spec.id,
                ChartPatch {
                    title: Some("Fuel".to_string()),
                    layout: Some(small),
                    ..ChartPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Fuel");
        assert_eq!(updated.layout.w, 2);
        assert!(updated.revision > spec.revision);
        assert_eq!(registry.get(&spec.id), Some(&updated));
    }

    #[test]
    fn test_unknown_ids_report_not_found() {
        let mut registry = ChartSpecRegistry::default();
        let ghost = ChartId::new("chart-404");

        assert!(registry.update(&ghost, ChartPatch::visible(false)).unwrap_err().is_not_found());
        assert!(registry.remove(&ghost).unwrap_err().is_not_found());
        assert!(registry.duplicate(&ghost).unwrap_err().is_not_found());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_missed_update_leaves_revisions_untouched() {
        let mut registry = ChartSpecRegistry::default();
        let spec = registry.create(draft()).unwrap();

        registry.update(&ChartId::new("chart-404"), ChartPatch::visible(false)).unwrap_err();
        let updated = registry.update(&spec.id, ChartPatch::visible(false)).unwrap();
        assert_eq!(updated.revision, spec.revision + 1);
    }

    #[test]
    fn test_panel_at_bottom_edge_does_not_break_placement() {
        let mut registry = ChartSpecRegistry::default();
        let far = registry
            .create(draft().layout(LayoutRect::at(0, u32::MAX)))
            .unwrap();
        assert_eq!(far.layout.bottom(), u32::MAX);

        let next = registry.create(draft()).unwrap();
        assert_eq!((next.layout.x, next.layout.y), (0, 0));
        let copy = registry.duplicate(&far.id).unwrap();
        assert_eq!(copy.layout.bottom(), u32::MAX);
    }
}
