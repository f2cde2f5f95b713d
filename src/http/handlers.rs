//! Route handlers.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::http::fault::AppError;
use crate::observability::LOGGER;

pub const GREETING: &str = "Hello from Datadog demo!";

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

/// `GET /`
pub async fn root() -> (StatusCode, &'static str) {
    tracing::info!(target: LOGGER, "Request received at '/'");
    (StatusCode::OK, GREETING)
}

/// `GET /healthz`. Polled by orchestrators; must stay silent and cheap.
pub async fn healthz() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}

/// `GET /error`: produces an error with stack context for the log pipeline.
pub async fn error_demo() -> Result<(), AppError> {
    tracing::error!(target: LOGGER, "Something went wrong! About to raise RuntimeError()");

    let err = AppError::runtime("Demo error!");
    tracing::error!(
        target: LOGGER,
        kind = err.kind(),
        reason = %err,
        stack = %err.stack_trace(),
        "Unhandled error in /error"
    );

    Err(err)
}
