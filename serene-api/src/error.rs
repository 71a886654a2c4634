use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use serene_core::repository::StoreError;
use serene_core::CoreError;

#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    UpstreamUnavailable(String),
    VerificationFailed(String),
    Internal(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            AppError::UpstreamUnavailable(msg) => {
                tracing::error!("Upstream unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "upstream_unavailable", msg)
            }
            AppError::VerificationFailed(msg) => {
                (StatusCode::BAD_REQUEST, "verification_failed", msg)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => AppError::Validation(msg),
            CoreError::InvalidAmount(msg) => AppError::Validation(msg),
            CoreError::VerificationFailed(msg) => AppError::VerificationFailed(msg),
            CoreError::UpstreamUnavailable(msg) => AppError::UpstreamUnavailable(msg),
            CoreError::Store(err) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Anyhow(err)
    }
}
