//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the three demo routes
//! - Wire up middleware (request ID, request span, tracing, timeout, fault boundary)
//! - Bind server to listener and shut down gracefully

use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnFailure, TraceLayer},
};
use tracing::Level;

use crate::config::ServiceConfig;
use crate::http::{fault, handlers, request};
use crate::observability::LoggingContext;

/// HTTP server for the demo service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server. Logging must already be set up from `logging`.
    pub fn new(config: ServiceConfig, logging: &LoggingContext) -> Self {
        let router = apply_middleware(routes(), &config, logging);
        Self { router, config }
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

/// The three demo routes, without middleware.
pub fn routes() -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/error", get(handlers::error_demo))
}

/// Wrap `router` in the service middleware stack.
///
/// Outermost first: request id, request span, trace, id propagation,
/// timeout, panic boundary. The request span sits outside `TraceLayer` so
/// framework events carry the correlation ids too. Failed responses are
/// already reported by the fault boundary, so `TraceLayer` reports them at debug.
#[allow(deprecated)]
pub fn apply_middleware(router: Router, config: &ServiceConfig, logging: &LoggingContext) -> Router {
    router
        .layer(CatchPanicLayer::custom(fault::handle_panic))
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().on_failure(DefaultOnFailure::new().level(Level::DEBUG)))
        .layer(middleware::from_fn_with_state(
            logging.correlation_enabled(),
            request::request_span,
        ))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
