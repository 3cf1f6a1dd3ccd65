use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::store::StoreError;

/// Error surfaced by the service layer and translated to an HTTP status by the routes.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    /// `message` is shown to the client, `detail` carries the underlying cause.
    #[error("{message}: {detail}")]
    Server { message: String, detail: String },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn server(message: impl Into<String>, detail: impl ToString) -> Self {
        AppError::Server {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    /// Wrap a persistence failure, keeping duplicate keys distinguishable.
    pub fn from_store(message: &str, err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(what) => AppError::Conflict(format!("{} already exists", what)),
            other => AppError::server(message, other),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Server { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::from_store("Database error", err)
    }
}

/// Malformed bodies, wrong content types and bodies over the cap all answer in the JSON envelope.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::Validation(rejection.body_text())
        }
    }
}

/// Failures that stop the process before it starts serving.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("refusing to start in production with the default JWT secret")]
    InsecureSecret,

    #[error("failed to connect to database: {0}")]
    Database(#[source] sqlx::Error),

    #[error("failed to run database migrations: {0}")]
    Migration(#[source] sqlx::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Error body shared by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            AppError::Server { message, detail } => {
                tracing::error!(error = %detail, "{}", message);
                ErrorResponse {
                    success: false,
                    message,
                    error: Some(detail),
                }
            }
            other => ErrorResponse {
                success: false,
                message: other.to_string(),
                error: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
