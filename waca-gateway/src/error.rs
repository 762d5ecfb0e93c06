//! Error types for the gateway crate.
//!
//! Infrastructure failures are answered with a fixed plain-text message per
//! failure kind. The underlying error, which may carry filesystem paths, only
//! reaches the log.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use waca_core::ValidationError;
use waca_executor::ExecutorError;

/// Errors that can occur during gateway request handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// A compile could not be carried out.
    #[error("executor error: {0}")]
    Executor(#[from] ExecutorError),

    /// A board or library listing query failed.
    #[error("toolchain query error: {0}")]
    Toolchain(#[source] ExecutorError),

    /// The request body is malformed or contains invalid values.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    /// The request body is missing, not declared as JSON, or not valid JSON.
    #[error("malformed request body: {0}")]
    MalformedBody(#[from] JsonRejection),
}

/// Client-facing text for a compile that failed for infrastructure reasons.
fn public_message(err: &ExecutorError) -> &'static str {
    match err {
        ExecutorError::WorkspaceAllocation(_) => "failed to allocate temporary sketch folder",
        ExecutorError::SketchWrite(_) => "failed to save sketch to disk.",
        ExecutorError::AuxiliaryCopy(_) => "failed to copy some files.",
        ExecutorError::OutputDir(_) => "failed to create compilation folder.",
        ExecutorError::Launch(_) => "failed to invoke compiler.",
        ExecutorError::Timeout { .. } => "compilation timed out.",
        ExecutorError::ArtifactMissing { .. } | ExecutorError::ArtifactRead(_) => {
            "failed to read compiler output."
        }
        _ => "internal server error.",
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::InvalidRequest(err) | GatewayError::Executor(ExecutorError::Rejected(err)) => {
                (StatusCode::BAD_REQUEST, err.to_string()).into_response()
            }
            GatewayError::MalformedBody(rejection) => {
                (StatusCode::BAD_REQUEST, rejection.body_text()).into_response()
            }
            GatewayError::Executor(err) => {
                (StatusCode::INTERNAL_SERVER_ERROR, public_message(&err)).into_response()
            }
            GatewayError::Toolchain(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "arduino-cli did not exit properly"})),
            )
                .into_response(),
        }
    }
}
