use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Local errors (Validation, Encoding) are never retried — retrying cannot fix
/// them. Remote failures reach this type only after the retry budget is spent,
/// already wrapped as a stage-specific variant.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Scene analysis failed: {0}")]
    SceneAnalysis(String),

    #[error("Composition failed: {0}")]
    Composition(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Encoding(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "ENCODING_ERROR",
                msg.clone(),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::SceneAnalysis(msg) => {
                tracing::error!("Scene analysis failed: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "SCENE_ANALYSIS_FAILED",
                    "Failed to analyze the scene image after multiple retries".to_string(),
                )
            }
            AppError::Composition(msg) => {
                tracing::error!("Composition failed: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "COMPOSITION_FAILED",
                    "Failed to generate the composite image after multiple retries".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
