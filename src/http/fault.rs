//! Global fault boundary.
//!
//! Every failure that escapes a route ends here. [`AppError`] values are
//! returned by handlers; panics are caught by `CatchPanicLayer` and mapped to
//! [`AppError::Internal`]. Both are logged once at error level and answered
//! with the same plain-text 500.

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::panic::Location;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::observability::LOGGER;

pub const INTERNAL_SERVER_ERROR_BODY: &str = "Internal Server Error";

/// Where a fault was raised, plus a backtrace when `RUST_BACKTRACE` allows it.
#[derive(Debug)]
pub struct StackContext {
    location: &'static Location<'static>,
    backtrace: Backtrace,
}

impl StackContext {
    #[track_caller]
    pub fn capture() -> Self {
        Self {
            location: Location::caller(),
            backtrace: Backtrace::capture(),
        }
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

impl fmt::Display for StackContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {}", self.location)?;
        if self.backtrace.status() == BacktraceStatus::Captured {
            write!(f, "\n{}", self.backtrace)?;
        }
        Ok(())
    }
}

/// A failure that ends the current request with a 500.
#[derive(Debug, Error)]
pub enum AppError {
    /// Raised deliberately by a handler.
    #[error("{message}")]
    Runtime { message: String, stack: StackContext },

    /// Anything else, e.g. a handler panic.
    #[error("{message}")]
    Internal {
        message: String,
        stack: Option<StackContext>,
    },
}

impl AppError {
    #[track_caller]
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
            stack: StackContext::capture(),
        }
    }

    /// Error class printed next to the message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Runtime { .. } => "RuntimeError",
            Self::Internal { .. } => "InternalError",
        }
    }

    pub fn stack(&self) -> Option<&StackContext> {
        match self {
            Self::Runtime { stack, .. } => Some(stack),
            Self::Internal { stack, .. } => stack.as_ref(),
        }
    }

    /// Stack context rendered for a log field.
    pub fn stack_trace(&self) -> String {
        self.stack()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unavailable".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(
            target: LOGGER,
            kind = self.kind(),
            reason = %self,
            stack = %self.stack_trace(),
            "Global handler caught an exception"
        );
        internal_server_error()
    }
}

pub fn internal_server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR_BODY).into_response()
}

/// Panic handler for `CatchPanicLayer::custom`.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "handler panicked".to_string()
    };

    AppError::Internal {
        message,
        stack: None,
    }
    .into_response()
}
