//! Axum route handlers for the waca gateway API.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Instrument;
use uuid::Uuid;
use waca_core::{query_flag, CompileRequest};
use waca_executor::{CompileOutcome, CompileRunner, Toolchain};

use crate::error::GatewayError;

/// Name reported by `GET /version`.
pub const PROGRAM_NAME: &str = "waca";

// ── Shared state ─────────────────────────────────────────────────────────────

type Runner<T> = Arc<CompileRunner<T>>;

// ── Request / response types ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub program: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompileQuery {
    pub include_lcd_deps: Option<String>,
}

/// Body of both the 200 and the compiler-failure 400 response.
#[derive(Debug, Serialize)]
pub struct CompileResponse {
    pub success: bool,
    /// Base64 image; present only on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    pub stdout: String,
    pub stderr: String,
}

impl From<CompileOutcome> for CompileResponse {
    fn from(outcome: CompileOutcome) -> Self {
        match outcome {
            CompileOutcome::Success { artifact, stdout, stderr } => Self {
                success: true,
                artifact: Some(artifact),
                stdout,
                stderr,
            },
            CompileOutcome::Failed { stdout, stderr } => Self {
                success: false,
                artifact: None,
                stdout,
                stderr,
            },
        }
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router around a compile runner.
pub fn create_router<T: Toolchain + 'static>(runner: Runner<T>) -> Router {
    Router::new()
        .route("/version", get(version))
        .route("/boards", get(boards::<T>))
        .route("/libraries", get(libraries::<T>))
        .route("/compile", post(compile::<T>))
        .route("/health", get(health))
        .with_state(runner)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /health`: liveness probe.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}

/// `GET /version`: service version and program name.
pub async fn version() -> Json<VersionResponse> {
    Json(VersionResponse { version: env!("CARGO_PKG_VERSION"), program: PROGRAM_NAME })
}

/// `GET /boards`: every board the toolchain knows about.
///
/// # Errors
/// Returns [`GatewayError::Toolchain`] if the listing query fails.
pub async fn boards<T: Toolchain + 'static>(
    State(runner): State<Runner<T>>,
) -> Result<Json<Value>, GatewayError> {
    let boards = runner.toolchain().board_list().await.map_err(|e| {
        tracing::warn!(error = %e, "board listing failed");
        GatewayError::Toolchain(e)
    })?;
    Ok(Json(boards))
}

/// `GET /libraries`: installed libraries, without their install locations.
///
/// # Errors
/// Returns [`GatewayError::Toolchain`] if the listing query fails.
pub async fn libraries<T: Toolchain + 'static>(
    State(runner): State<Runner<T>>,
) -> Result<Json<Value>, GatewayError> {
    let libraries = runner.toolchain().library_list().await.map_err(|e| {
        tracing::warn!(error = %e, "library listing failed");
        GatewayError::Toolchain(e)
    })?;
    Ok(Json(libraries))
}

/// `POST /compile`: compile a sketch.
///
/// Responds 200 with the artifact on success and 400 with sanitized
/// diagnostics when the compiler rejects the sketch.
///
/// # Errors
/// Returns [`GatewayError::MalformedBody`] when the body is not JSON,
/// [`GatewayError::InvalidRequest`] when its fields are invalid, and
/// [`GatewayError::Executor`] for a rejected sketch or an infrastructure fault.
pub async fn compile<T: Toolchain + 'static>(
    State(runner): State<Runner<T>>,
    Query(query): Query<CompileQuery>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let Json(body) = body?;
    let request = CompileRequest::from_json(&body, query_flag(query.include_lcd_deps.as_deref()))?;

    let span = tracing::info_span!("compile", compile_id = %Uuid::new_v4(), board = %request.board);
    let outcome = runner.compile(&request).instrument(span).await?;

    let status = if outcome.is_success() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(CompileResponse::from(outcome))).into_response())
}
