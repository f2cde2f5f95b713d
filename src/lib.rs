//! Log/trace correlation demo service.
//!
//! Three routes (`/`, `/healthz`, `/error`) behind an axum server whose log
//! lines carry the propagated trace and span ids, so an observability agent
//! tailing stdout can join them to traces.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::LoggingContext;
