/**
 * Resource Routes
 * Catalog add/update (single and bulk), topic lookup and topic listing
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ApiResponse, JsonBody};
use crate::db::store::UpsertOutcome;
use crate::error::AppError;
use crate::services::catalog::{BulkReport, ResourceInput};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct BulkResponse {
    pub success: bool,
    pub message: String,
    pub results: BulkReport,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopicQuery {
    #[serde(default)]
    pub topic: String,
}

async fn run_bulk(state: &AppState, items: Vec<Value>) -> Result<Response, AppError> {
    let results = state.catalog.add_or_update_bulk(items).await?;
    Ok(Json(BulkResponse {
        success: true,
        message: "Bulk operation completed".to_string(),
        results,
    })
    .into_response())
}

/// POST /api/v1/resource/addresource
/// An array body is treated as a bulk request.
pub async fn add_resource(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Value>,
) -> Result<Response, AppError> {
    match payload {
        Value::Array(items) => run_bulk(&state, items).await,
        Value::Object(_) => {
            let input = serde_json::from_value::<ResourceInput>(payload)
                .map_err(|e| AppError::validation(format!("Malformed resource: {}", e)))?;
            let (outcome, resource) = state.catalog.add_or_update(input).await?;
            let (status, message) = match outcome {
                UpsertOutcome::Created => (StatusCode::CREATED, "Resource added successfully"),
                UpsertOutcome::Updated => (StatusCode::OK, "Resource updated successfully"),
            };
            Ok((status, Json(ApiResponse::data(message, resource))).into_response())
        }
        _ => Err(AppError::validation(
            "Please provide topic, level, and subcategories",
        )),
    }
}

/// POST /api/v1/resource/bulk
pub async fn bulk_resources(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Value>,
) -> Result<Response, AppError> {
    match payload {
        Value::Array(items) => run_bulk(&state, items).await,
        _ => Err(AppError::validation("Please provide an array of resources")),
    }
}

/// POST /api/v1/resource/getresource
pub async fn get_resource(
    State(state): State<AppState>,
    JsonBody(query): JsonBody<TopicQuery>,
) -> Result<impl IntoResponse, AppError> {
    let resource = state.catalog.find_by_topic_exact(&query.topic).await?;
    Ok(Json(ApiResponse::data("Resource retrieved successfully", resource)))
}

/// GET /api/v1/resource/topics
pub async fn list_topics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let topics = state.catalog.list_all_topics().await?;
    Ok(Json(ApiResponse::list("Topics retrieved successfully", topics)))
}

/// GET /api/v1/resource/topic/{topic}
pub async fn resources_by_topic(
    State(state): State<AppState>,
    Path(topic): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let resources = state.catalog.find_all_by_topic(&topic).await?;
    Ok(Json(ApiResponse::list(
        "Resources retrieved successfully",
        resources,
    )))
}
