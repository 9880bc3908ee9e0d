// Render collaborator seam: consumes series groups, draws nothing itself
use crate::domain::chart::{ChartId, LayoutRect, StyleConfig};
use crate::domain::series::SeriesGroup;

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub chart_id: ChartId,
    pub title: String,
    pub rect: LayoutRect,
    pub fullscreen: bool,
}

pub trait PanelRenderer {
    fn render(&self, group: &SeriesGroup, style: &StyleConfig, viewport: &Viewport);
}
