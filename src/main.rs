// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_controller::DashboardController;
use crate::application::refresh::run_refresh_loop;
use crate::infrastructure::backend_repository::BackendRepository;
use crate::infrastructure::config::load_app_config;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    clear_dashboard, create_chart, delete_chart, duplicate_chart, enter_fullscreen, exit_fullscreen,
    export_dashboard, fetch_telemetry, get_dashboard, health_check, list_charts, list_vehicles, logout,
    propose_layout, set_edit_mode, show_all, stream_dashboard, toggle_visibility, update_chart,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(BackendRepository::new(config.backend.clone())?);

    // Create controller (application layer)
    let controller = DashboardController::new(repository, config.dashboard.session_settings());
    if let Err(e) = controller.load_vehicles().await {
        // Names fall back to ids until the next successful load
        tracing::warn!("vehicle listing unavailable: {}", e);
    }

    if config.dashboard.refresh_interval_secs > 0 {
        let period = Duration::from_secs(config.dashboard.refresh_interval_secs);
        tracing::info!("refreshing every {:?}", period);
        tokio::spawn(run_refresh_loop(controller.clone(), period));
    }

    let state = Arc::new(AppState { controller });

    // Build router (presentation layer)
    // Compression is handled per response, so there is no CompressionLayer
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/vehicles", get(list_vehicles))
        .route("/telemetry/fetch", post(fetch_telemetry))
        .route("/dashboard", get(get_dashboard).delete(clear_dashboard))
        .route("/dashboard/export", get(export_dashboard))
        .route("/dashboard/stream", get(stream_dashboard))
        .route("/session/logout", post(logout))
        .route("/charts", get(list_charts).post(create_chart))
        .route("/charts/show-all", post(show_all))
        .route("/charts/:id", delete(delete_chart).patch(update_chart))
        .route("/charts/:id/duplicate", post(duplicate_chart))
        .route("/charts/:id/layout", put(propose_layout))
        .route("/charts/:id/visibility", post(toggle_visibility))
        .route("/charts/:id/fullscreen", post(enter_fullscreen))
        .route("/fullscreen", delete(exit_fullscreen))
        .route("/layout/edit-mode", put(set_edit_mode))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting fleet-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
