// Application state for HTTP handlers
use crate::application::dashboard_controller::DashboardController;

#[derive(Clone)]
pub struct AppState {
    pub controller: DashboardController,
}
