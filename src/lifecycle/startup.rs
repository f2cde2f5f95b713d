//! Startup orchestration.
//!
//! Order: config, then logging, then listener. Logging is installed before
//! anything that can emit a request log line. Any startup error is fatal.

use std::path::PathBuf;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{self, ConfigError, ServiceConfig};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{LoggingContext, LoggingError, LOGGER};

/// Startup inputs gathered from the command line.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    /// Optional TOML config file.
    pub config_path: Option<PathBuf>,
    /// Bind address override; wins over file and environment.
    pub bind_address: Option<String>,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error("listener: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolve the effective config: file (or defaults), environment, then CLI.
pub fn resolve_config<F>(options: &StartupOptions, lookup: F) -> Result<ServiceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let base = match &options.config_path {
        Some(path) => config::load_config(path)?,
        None => ServiceConfig::default(),
    };

    let mut resolved = config::apply_env_overrides(base, lookup)?;

    if let Some(addr) = &options.bind_address {
        resolved.listener.bind_address = addr.clone();
        config::validation::validate_config(&resolved).map_err(ConfigError::Validation)?;
    }

    Ok(resolved)
}

/// Bring the service up and serve until a termination signal arrives.
pub async fn run(options: StartupOptions) -> Result<(), StartupError> {
    let config = resolve_config(&options, |name| std::env::var(name).ok())?;

    let logging = LoggingContext::from_config(&config.logging);
    logging.install()?;

    tracing::info!(
        target: LOGGER,
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        correlation_enabled = logging.correlation_enabled(),
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(signals::wait_for_signal(shutdown));

    HttpServer::new(config, &logging)
        .run(listener, server_shutdown)
        .await?;

    tracing::info!(target: LOGGER, "Shutdown complete");
    Ok(())
}
