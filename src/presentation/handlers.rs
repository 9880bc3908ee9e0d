// HTTP request handlers
use crate::application::fetch_batch::FetchRequest;
use crate::application::layout_manager::LayoutOutcome;
use crate::domain::chart::{ChartDraft, ChartId, ChartPatch, LayoutProposal};
use crate::domain::error::{DashboardError, ValidationError};
use crate::infrastructure::chunked_json::stream_response;
use crate::infrastructure::frame_renderer::live_frames;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

type ApiResult = Result<Response, ApiError>;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        let code = match e {
            ValidationError::EmptyVehicleSelection => "empty_vehicle_selection",
            ValidationError::EmptyMetricSelection => "empty_metric_selection",
            ValidationError::MalformedDateRange { .. } => "malformed_date_range",
        };
        Self {
            status: StatusCode::BAD_REQUEST,
            code,
            message: e.to_string(),
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(e: DashboardError) -> Self {
        let message = e.to_string();
        match e {
            DashboardError::Validation(e) => e.into(),
            DashboardError::ChartNotFound(_) => Self {
                status: StatusCode::NOT_FOUND,
                code: "chart_not_found",
                message,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": true,
            "message": self.message,
            "code": self.code,
        });
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct EditModeBody {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
struct ShowAllReply {
    revealed: usize,
}

async fn reply<T: Serialize>(headers: &HeaderMap, status: StatusCode, data: &T) -> Response {
    match json_response(data, status, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Unknown ids in layout requests answer 404 but keep the outcome body.
async fn reply_outcome(headers: &HeaderMap, outcome: &LayoutOutcome) -> Response {
    let status = match outcome {
        LayoutOutcome::NotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::OK,
    };
    reply(headers, status, outcome).await
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Vehicle directory as last loaded from the backend
pub async fn list_vehicles(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let vehicles = state
        .controller
        .read(|s| s.directory().vehicles().to_vec())
        .await;
    reply(&headers, StatusCode::OK, &vehicles).await
}

pub async fn fetch_telemetry(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<FetchRequest>,
) -> ApiResult {
    let report = state.controller.fetch(request).await?;
    Ok(reply(&headers, StatusCode::OK, &report).await)
}

pub async fn get_dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let view = state.controller.read(|s| s.view()).await;
    reply(&headers, StatusCode::OK, &view).await
}

pub async fn export_dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let export = state.controller.read(|s| s.export(Utc::now())).await;
    reply(&headers, StatusCode::OK, &export).await
}

/// Live panel frames, one per session change
pub async fn stream_dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    stream_response(live_frames(state.controller.clone()), accepts_brotli(&headers))
}

pub async fn clear_dashboard(State(state): State<Arc<AppState>>) -> StatusCode {
    state.controller.mutate(|s| s.clear_all()).await;
    StatusCode::NO_CONTENT
}

pub async fn logout(State(state): State<Arc<AppState>>) -> StatusCode {
    state.controller.mutate(|s| s.logout()).await;
    tracing::info!("session logged out");
    StatusCode::NO_CONTENT
}

pub async fn list_charts(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let charts = state.controller.read(|s| s.registry().list().to_vec()).await;
    reply(&headers, StatusCode::OK, &charts).await
}

pub async fn create_chart(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(draft): Json<ChartDraft>,
) -> ApiResult {
    let spec = state.controller.mutate(|s| s.add_chart(draft)).await?;
    Ok(reply(&headers, StatusCode::CREATED, &spec).await)
}

pub async fn update_chart(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(patch): Json<ChartPatch>,
) -> ApiResult {
    let id = ChartId::new(id);
    let spec = state.controller.mutate(|s| s.update_chart(&id, patch)).await?;
    Ok(reply(&headers, StatusCode::OK, &spec).await)
}

pub async fn delete_chart(Path(id): Path<String>, State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    let id = ChartId::new(id);
    state.controller.mutate(|s| s.remove_chart(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn duplicate_chart(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    let id = ChartId::new(id);
    let copy = state.controller.mutate(|s| s.duplicate_chart(&id)).await?;
    Ok(reply(&headers, StatusCode::CREATED, &copy).await)
}

pub async fn propose_layout(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(proposal): Json<LayoutProposal>,
) -> Response {
    let id = ChartId::new(id);
    let outcome = state.controller.mutate(|s| s.propose_layout(&id, proposal)).await;
    reply_outcome(&headers, &outcome).await
}

pub async fn toggle_visibility(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let id = ChartId::new(id);
    let outcome = state.controller.mutate(|s| s.toggle_visible(&id)).await;
    reply_outcome(&headers, &outcome).await
}

pub async fn show_all(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let revealed = state.controller.mutate(|s| s.show_all()).await;
    reply(&headers, StatusCode::OK, &ShowAllReply { revealed }).await
}

pub async fn enter_fullscreen(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let id = ChartId::new(id);
    let outcome = state.controller.mutate(|s| s.enter_fullscreen(&id)).await;
    reply_outcome(&headers, &outcome).await
}

pub async fn exit_fullscreen(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    match state.controller.mutate(|s| s.exit_fullscreen()).await {
        Some(outcome) => reply_outcome(&headers, &outcome).await,
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

pub async fn set_edit_mode(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<EditModeBody>,
) -> Response {
    state.controller.mutate(|s| s.set_edit_mode(body.enabled)).await;
    reply(&headers, StatusCode::OK, &json!({ "edit_mode": body.enabled })).await
}
