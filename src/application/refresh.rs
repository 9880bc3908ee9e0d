// Periodic refresh of the active selection
use crate::application::dashboard_controller::DashboardController;
use chrono::Utc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Re-run the last fetch every `period` until the task is dropped. Ticks that
/// arrive before anything was fetched do nothing.
pub async fn run_refresh_loop(controller: DashboardController, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match controller.refresh(Utc::now()).await {
            Ok(Some(report)) => tracing::debug!(
                "refresh batch {} finished as {:?}",
                report.batch,
                report.state
            ),
            Ok(None) => tracing::trace!("refresh skipped: nothing selected"),
            Err(e) => tracing::warn!("refresh rejected: {}", e),
        }
    }
}
