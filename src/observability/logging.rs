//! Structured logging.
//!
//! # Responsibilities
//! - Run the log-correlation capability check once at startup
//! - Install a single stdout sink with the correlated line format
//! - Keep installation idempotent
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `LoggingContext` is built explicitly and handed to the server
//! - Log level from config, `RUST_LOG` overrides it

use tracing::Subscriber;
use tracing_subscriber::filter::{Directive, EnvFilter};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;
use crate::observability::correlation::CorrelationLayer;
use crate::observability::format::CorrelatedFormat;
use crate::observability::{CORRELATION_TARGET, LOGGER};

/// Error type for logging setup.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
}

/// Result of [`LoggingContext::install`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Installed {
    /// This call installed the process-wide sink.
    Fresh,
    /// A sink was already in place; nothing was added.
    AlreadyInstalled,
}

/// Process-wide logging configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct LoggingContext {
    config: LoggingConfig,
    correlation_enabled: bool,
}

impl LoggingContext {
    /// Build the context and perform the correlation capability check.
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            config: config.clone(),
            correlation_enabled: config.logs_injection,
        }
    }

    /// Whether propagated trace/span ids are interpolated into log lines.
    pub fn correlation_enabled(&self) -> bool {
        self.correlation_enabled
    }

    pub fn logger_name(&self) -> &str {
        &self.config.logger_name
    }

    /// Build a subscriber writing to `make_writer`, filtered by the configured level only.
    pub fn subscriber<W>(&self, make_writer: W) -> Result<impl Subscriber + Send + Sync + 'static, LoggingError>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let filter = EnvFilter::try_new(&self.config.level)?;
        self.build(filter, make_writer)
    }

    /// Install the stdout sink as the process-wide default.
    pub fn install(&self) -> Result<Installed, LoggingError> {
        self.install_with_writer(std::io::stdout)
    }

    /// Install with an arbitrary sink. A second call is a no-op.
    pub fn install_with_writer<W>(&self, make_writer: W) -> Result<Installed, LoggingError>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(&self.config.level)?,
        };

        let installed = match self.build(filter, make_writer)?.try_init() {
            Ok(()) => Installed::Fresh,
            Err(_) => Installed::AlreadyInstalled,
        };

        if installed == Installed::Fresh {
            self.report();
        }
        Ok(installed)
    }

    fn build<W>(&self, filter: EnvFilter, make_writer: W) -> Result<impl Subscriber + Send + Sync + 'static, LoggingError>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        // Request spans must exist whatever the level so error lines still carry ids.
        let always: Directive = format!("{CORRELATION_TARGET}=trace").parse()?;

        Ok(tracing_subscriber::registry()
            .with(filter.add_directive(always))
            .with(CorrelationLayer)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .event_format(CorrelatedFormat::new(self.logger_name()))
                    .with_writer(make_writer),
            ))
    }

    fn report(&self) {
        tracing::info!(
            target: LOGGER,
            log_level = %self.config.level,
            correlation_enabled = self.correlation_enabled,
            "Logging initialized"
        );
        if !self.correlation_enabled {
            tracing::info!(
                target: LOGGER,
                "Log correlation disabled; set DD_LOGS_INJECTION=true to print propagated trace ids"
            );
        }
    }
}
