// Infrastructure layer - External dependencies and adapters
pub mod backend_repository;
pub mod chunked_json;
pub mod config;
pub mod frame_renderer;
pub mod http_response;
