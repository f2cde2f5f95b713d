//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! request span (http::request) carries trace_id / span_id
//!     → correlation.rs (CorrelationLayer stores ids in span extensions)
//!     → format.rs (CorrelatedFormat prints innermost ids on each line)
//!     → logging.rs (single stdout sink, installed once)
//! ```

pub mod correlation;
pub mod format;
pub mod logging;

pub use correlation::{CorrelationIds, CorrelationLayer};
pub use format::CorrelatedFormat;
pub use logging::{Installed, LoggingContext, LoggingError};

/// Target of application log events; printed as the logger name.
pub const LOGGER: &str = "demo-app";

/// Target of per-request correlation spans. Always enabled by the filter.
pub const CORRELATION_TARGET: &str = "correlation";
