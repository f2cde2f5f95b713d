//! Log/trace correlation demo service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌───────────────────────────────────────────────┐
//!     ─────────────────────▶│ RequestId → request span (trace_id, span_id)  │
//!                           │   → TraceLayer → Timeout                      │
//!                           │   → CatchPanic (fault boundary)               │
//!                           │   → /  |  /healthz  |  /error                 │
//!     ◀─────────────────────│ AppError → 500 "Internal Server Error"        │
//!                           └──────────────────────┬────────────────────────┘
//!                                                  │ events
//!                                                  ▼
//!                           CorrelationLayer + CorrelatedFormat → stdout
//! ```

use std::path::PathBuf;

use clap::Parser;

use log_correlation_demo::lifecycle::{startup, StartupOptions};

#[derive(Parser)]
#[command(name = "log-correlation-demo")]
#[command(about = "Demo web service with trace-correlated stdout logs", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, e.g. 0.0.0.0:8080.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    startup::run(StartupOptions {
        config_path: cli.config,
        bind_address: cli.bind,
    })
    .await?;

    Ok(())
}
