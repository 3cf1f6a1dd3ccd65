/**
 * History Routes
 * Record, list and delete topic visits
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::{ApiResponse, JsonBody, MessageResponse};
use crate::error::AppError;
use crate::services::history::VisitRequest;
use crate::state::AppState;

/// POST /api/v1/history/addhistory
pub async fn add_history(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<VisitRequest>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state
        .history
        .record(&payload.email, &payload.topic)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data("Visit history recorded successfully", entry)),
    ))
}

/// GET /api/v1/history/user/{email}
pub async fn list_history(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let entries = state.history.list_by_user(&email).await?;
    Ok(Json(ApiResponse::list("History retrieved successfully", entries)))
}

/// DELETE /api/v1/history/{id}
pub async fn delete_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.history.delete_by_id(&id).await?;
    Ok(Json(MessageResponse::ok("History entry deleted successfully")))
}
