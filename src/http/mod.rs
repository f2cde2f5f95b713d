//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request span with trace/span ids)
//!     → handlers.rs (/, /healthz, /error)
//!     → fault.rs (AppError / panic → 500)
//!     → Send to client
//! ```

pub mod fault;
pub mod handlers;
pub mod request;
pub mod server;

pub use fault::{AppError, StackContext, INTERNAL_SERVER_ERROR_BODY};
pub use handlers::GREETING;
pub use server::HttpServer;
