/**
 * Profile Routes
 * Profile fetch/update by email and password change
 */
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use super::{ApiResponse, JsonBody, MessageResponse};
use crate::db::models::ProfileUpdate;
use crate::error::AppError;
use crate::services::profile::PasswordChange;
use crate::state::AppState;

/// GET /api/v1/profile/{email}
pub async fn get_profile(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (profile, stored) = state.profiles.get_profile(&email).await?;
    let message = if stored {
        "Profile retrieved successfully"
    } else {
        "Profile retrieved successfully (default)"
    };
    Ok(Json(ApiResponse::data(message, profile)))
}

/// PUT /api/v1/profile/{email}
pub async fn update_profile(
    State(state): State<AppState>,
    Path(email): Path<String>,
    JsonBody(update): JsonBody<ProfileUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.profiles.update_profile(&email, update).await?;
    Ok(Json(ApiResponse::data("Profile updated successfully", profile)))
}

/// PUT /api/v1/profile/password/{email}
pub async fn update_password(
    State(state): State<AppState>,
    Path(email): Path<String>,
    JsonBody(change): JsonBody<PasswordChange>,
) -> Result<impl IntoResponse, AppError> {
    state.profiles.update_password(&email, change).await?;
    Ok(Json(MessageResponse::ok("Password updated successfully")))
}
