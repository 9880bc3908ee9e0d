// Layout manager - panel visibility, fullscreen focus and grid mutation
use crate::application::chart_registry::ChartSpecRegistry;
use crate::domain::chart::{ChartId, ChartPatch, ChartSpec, LayoutProposal, LayoutRect};
use crate::domain::dashboard::PanelState;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    EditModeOff,
    FullscreenActive,
    PanelHidden,
}

/// Result of a layout request. Nothing here is an error: unknown ids and
/// gated requests are reported and otherwise do nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LayoutOutcome {
    Applied { state: PanelState, layout: LayoutRect },
    Ignored { reason: IgnoreReason },
    NotFound { id: ChartId },
}

impl LayoutOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, LayoutOutcome::Applied { .. })
    }
}

#[derive(Debug, Default)]
pub struct LayoutManager {
    edit_mode: bool,
    fullscreen: Option<ChartId>,
}

impl LayoutManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn set_edit_mode(&mut self, enabled: bool) {
        self.edit_mode = enabled;
    }

    pub fn fullscreen(&self) -> Option<&ChartId> {
        self.fullscreen.as_ref()
    }

    pub fn panel_state(&self, spec: &ChartSpec) -> PanelState {
        if !spec.visible {
            PanelState::Hidden
        } else if self.fullscreen.as_ref() == Some(&spec.id) {
            PanelState::Fullscreen
        } else {
            PanelState::Grid
        }
    }

    /// Flip `Hidden <-> Grid`. Hiding the fullscreen panel also ends fullscreen.
    pub fn toggle_visible(&mut self, registry: &mut ChartSpecRegistry, id: &ChartId) -> LayoutOutcome {
        let Some(spec) = registry.get(id) else {
            return not_found(id);
        };
        let visible = !spec.visible;
        if !visible && self.fullscreen.as_ref() == Some(id) {
            self.fullscreen = None;
        }
        self.commit(registry, id, ChartPatch::visible(visible))
    }

    /// Reveal every hidden panel, returning how many changed.
    pub fn show_all(&mut self, registry: &mut ChartSpecRegistry) -> usize {
        let hidden: Vec<ChartId> = registry
            .list()
            .iter()
            .filter(|s| !s.visible)
            .map(|s| s.id.clone())
            .collect();
        for id in &hidden {
            self.commit(registry, id, ChartPatch::visible(true));
        }
        hidden.len()
    }

    /// Focus one panel. A second call on another panel moves the focus.
    pub fn enter_fullscreen(&mut self, registry: &ChartSpecRegistry, id: &ChartId) -> LayoutOutcome {
        let Some(spec) = registry.get(id) else {
            return not_found(id);
        };
        if !spec.visible {
            return ignored(IgnoreReason::PanelHidden);
        }
        if let Some(previous) = self.fullscreen.replace(id.clone()) {
            if &previous != id {
                tracing::debug!("fullscreen focus moved from {} to {}", previous, id);
            }
        }
        LayoutOutcome::Applied {
            state: PanelState::Fullscreen,
            layout: spec.layout,
        }
    }

    pub fn exit_fullscreen(&mut self, registry: &ChartSpecRegistry) -> Option<LayoutOutcome> {
        let id = self.fullscreen.take()?;
        Some(match registry.get(&id) {
            Some(spec) => LayoutOutcome::Applied {
                state: self.panel_state(spec),
                layout: spec.layout,
            },
            None => not_found(&id),
        })
    }

    /// Drop any focus held by a chart that no longer exists.
    pub fn forget(&mut self, id: &ChartId) {
        if self.fullscreen.as_ref() == Some(id) {
            self.fullscreen = None;
        }
    }

    /// Propose a new rectangle from a drag or resize. Accepted only in edit
    /// mode, with no panel fullscreen, for a visible panel. The proposal is
    /// clamped to the panel's minimums and a non-negative origin; overlap with
    /// other panels is allowed.
    pub fn propose(
        &mut self,
        registry: &mut ChartSpecRegistry,
        id: &ChartId,
        proposal: LayoutProposal,
    ) -> LayoutOutcome {
        let Some(spec) = registry.get(id) else {
            return not_found(id);
        };
        if !self.edit_mode {
            return ignored(IgnoreReason::EditModeOff);
        }
        if self.fullscreen.is_some() {
            return ignored(IgnoreReason::FullscreenActive);
        }
        if !spec.visible {
            return ignored(IgnoreReason::PanelHidden);
        }

        let layout = proposal.clamp_onto(&spec.layout);
        self.commit(registry, id, ChartPatch::layout(layout))
    }

    pub fn move_panel(&mut self, registry: &mut ChartSpecRegistry, id: &ChartId, x: i64, y: i64) -> LayoutOutcome {
        let Some(current) = registry.get(id).map(|s| s.layout) else {
            return not_found(id);
        };
        let proposal = LayoutProposal {
            x,
            y,
            w: current.w as i64,
            h: current.h as i64,
        };
        self.propose(registry, id, proposal)
    }

    pub fn resize_panel(&mut self, registry: &mut ChartSpecRegistry, id: &ChartId, w: i64, h: i64) -> LayoutOutcome {
        let Some(current) = registry.get(id).map(|s| s.layout) else {
            return not_found(id);
        };
        let proposal = LayoutProposal {
            x: current.x as i64,
            y: current.y as i64,
            w,
            h,
        };
        self.propose(registry, id, proposal)
    }

    /// Specs currently laid out in the grid, in registry order.
    pub fn visible_panels<'a>(&self, registry: &'a ChartSpecRegistry) -> Vec<&'a ChartSpec> {
        registry.list().iter().filter(|s| s.visible).collect()
    }

    fn commit(&self, registry: &mut ChartSpecRegistry, id: &ChartId, patch: ChartPatch) -> LayoutOutcome {
        match registry.update(id, patch) {
            Ok(spec) => LayoutOutcome::Applied {
                state: self.panel_state(&spec),
                layout: spec.layout,
            },
            Err(_) => not_found(id),
        }
    }
}

fn not_found(id: &ChartId) -> LayoutOutcome {
    LayoutOutcome::NotFound { id: id.clone() }
}

fn ignored(reason: IgnoreReason) -> LayoutOutcome {
    LayoutOutcome::Ignored { reason }
}
