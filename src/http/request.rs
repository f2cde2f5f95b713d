//! Per-request span.
//!
//! # Responsibilities
//! - Read propagated trace context from request headers
//! - Open the span whose ids every log line inside the request prints
//!
//! # Design Decisions
//! - Request ID is added by `SetRequestIdLayer` before this runs
//! - With correlation disabled the ids stay 0

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;

use crate::observability::{CorrelationIds, CORRELATION_TARGET};

pub const X_REQUEST_ID: &str = "x-request-id";

/// Middleware wrapping the rest of the stack in a `request` span.
pub async fn request_span(
    State(correlation_enabled): State<bool>,
    request: Request,
    next: Next,
) -> Response {
    let ids = if correlation_enabled {
        CorrelationIds::from_headers(request.headers()).unwrap_or_default()
    } else {
        CorrelationIds::default()
    };

    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let span = tracing::info_span!(
        target: CORRELATION_TARGET,
        "request",
        trace_id = ids.trace_id,
        span_id = ids.span_id,
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    next.run(request).instrument(span).await
}
