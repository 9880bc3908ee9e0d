// Frame renderer - turns render calls into serializable panel frames
use crate::application::dashboard_controller::DashboardController;
use crate::application::renderer::{PanelRenderer, Viewport};
use crate::domain::chart::{ChartId, LayoutRect, StyleConfig};
use crate::domain::dashboard::LoadState;
use crate::domain::series::SeriesGroup;
use crate::domain::telemetry::VehicleId;
use futures::stream::Stream;
use futures::StreamExt;
use serde::Serialize;
use std::sync::Mutex;
use tokio_stream::wrappers::WatchStream;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelFrame {
    pub chart_id: ChartId,
    pub title: String,
    pub fullscreen: bool,
    pub rect: LayoutRect,
    pub style: StyleConfig,
    pub series: SeriesGroup,
}

/// One message of the live stream: everything currently on screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardFrame {
    pub generation: u64,
    pub load_state: LoadState,
    pub edit_mode: bool,
    pub failed_vehicles: Vec<VehicleId>,
    pub panels: Vec<PanelFrame>,
}

#[derive(Debug, Default)]
pub struct FrameCollector {
    frames: Mutex<Vec<PanelFrame>>,
}

impl FrameCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_frames(self) -> Vec<PanelFrame> {
        self.frames.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PanelRenderer for FrameCollector {
    fn render(&self, group: &SeriesGroup, style: &StyleConfig, viewport: &Viewport) {
        let frame = PanelFrame {
            chart_id: viewport.chart_id.clone(),
            title: viewport.title.clone(),
            fullscreen: viewport.fullscreen,
            rect: viewport.rect,
            style: style.clone(),
            series: group.clone(),
        };
        match self.frames.lock() {
            Ok(mut frames) => frames.push(frame),
            Err(poisoned) => poisoned.into_inner().push(frame),
        }
    }
}

pub async fn snapshot(controller: &DashboardController, generation: u64) -> DashboardFrame {
    controller
        .read(|session| {
            let collector = FrameCollector::new();
            session.render_panels(&collector);
            DashboardFrame {
                generation,
                load_state: session.load_state(),
                edit_mode: session.layout().edit_mode(),
                failed_vehicles: session.failed_vehicles().to_vec(),
                panels: collector.into_frames(),
            }
        })
        .await
}

/// Current frame, then a new frame after every session change. Changes that
/// land while a frame is being built are coalesced into the next one.
pub fn live_frames(controller: DashboardController) -> impl Stream<Item = DashboardFrame> + Send + 'static {
    async_stream::stream! {
        let mut updates = WatchStream::new(controller.subscribe());
        while let Some(generation) = updates.next().await {
            yield snapshot(&controller, generation).await;
        }
    }
}
