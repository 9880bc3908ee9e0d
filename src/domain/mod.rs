// Domain layer - Plain data shared by every other layer
pub mod chart;
pub mod dashboard;
pub mod error;
pub mod series;
pub mod telemetry;
pub mod vehicle;
