// Application layer - Session state, use cases and the ports they depend on
pub mod chart_registry;
pub mod dashboard_controller;
pub mod dashboard_session;
pub mod fetch_batch;
pub mod layout_manager;
pub mod refresh;
pub mod renderer;
pub mod series_builder;
pub mod telemetry_repository;
pub mod telemetry_store;
pub mod vehicle_directory;

#[cfg(test)]
pub mod test_support;
