//! Configuration validation.
//!
//! Serde handles the syntax. This module checks values: the address must
//! parse, the level must be known, and timeouts must be positive. Every error
//! is returned, not just the first.

use std::net::SocketAddr;

use thiserror::Error;
use tracing::Level;

use crate::config::schema::ServiceConfig;

/// A single semantic problem found in a [`ServiceConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("logging.level {0:?} is not one of trace, debug, info, warn, error")]
    LogLevel(String),

    #[error("logging.logger_name must be non-empty and contain no whitespace")]
    LoggerName,

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Check a config, collecting every problem.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.logging.level.parse::<Level>().is_err() {
        errors.push(ValidationError::LogLevel(config.logging.level.clone()));
    }

    let name = &config.logging.logger_name;
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        errors.push(ValidationError::LoggerName);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
