/**
 * Authentication Routes
 * Register, login (JWT), token verification and stateless logout
 */
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use super::{JsonBody, MessageResponse};
use crate::error::AppError;
use crate::services::auth::{LoginRequest, RegisterRequest};
use crate::services::token::extract_bearer_token;
use crate::state::AppState;

/// Expires the `token` cookie a browser client may hold.
const CLEAR_TOKEN_COOKIE: &str = "token=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub success: bool,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyResponse {
    fn invalid(error: impl Into<String>) -> Self {
        Self {
            success: false,
            is_valid: false,
            user_id: None,
            email: None,
            error: Some(error.into()),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/user/register
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.auth.register(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::ok("User created successfully")),
    ))
}

/// POST /api/v1/user/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.auth.login(payload).await?;
    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            success: true,
            message: "Login successful".to_string(),
            token: session.token,
            user_id: session.user_id,
        }),
    ))
}

/// POST /api/v1/user/logout
/// No server-side session exists; the client drops its token.
pub async fn logout() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, CLEAR_TOKEN_COOKIE)],
        Json(MessageResponse::ok("User logged out successfully")),
    )
}

/// POST /api/v1/user/verify
/// Report whether the bearer token is valid; always 200.
pub async fn verify_token(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let Some(token) = extract_bearer_token(&headers) else {
        return Json(VerifyResponse::invalid("No authorization token provided"));
    };

    match state.auth.verify_token(&token) {
        Ok(claims) => Json(VerifyResponse {
            success: true,
            is_valid: true,
            user_id: Some(claims.sub),
            email: Some(claims.email),
            error: None,
        }),
        Err(e) => Json(VerifyResponse::invalid(e.to_string())),
    }
}
