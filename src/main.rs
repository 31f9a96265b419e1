//! ACME Issuance Front End
//!
//! Serves the ACME protocol surface over plaintext HTTP and, optionally, TLS.
//!
//! # Architecture Overview
//!
//! ```text
//!     config file ──▶ config ──▶ trust (chains) ──▶ http (router)
//!                                                      │
//!     Client ─────────────▶ net (plaintext + TLS) ─────┘
//!                                 ▲
//!     SIGTERM/SIGINT/SIGHUP ──▶ lifecycle (drain under deadline)
//! ```

use std::path::PathBuf;

use clap::Parser;

use issuance_frontend::config::load_config;
use issuance_frontend::lifecycle::{self, TerminationSignals};
use issuance_frontend::observability;

#[derive(Parser)]
#[command(name = "issuance-frontend")]
#[command(about = "ACME issuance front end", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    observability::init(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "issuance-frontend starting"
    );

    let signals = TerminationSignals::install()?;
    let started = lifecycle::start(&config).await.map_err(|e| {
        tracing::error!(error = %e, "Startup failed");
        e
    })?;

    let report = started
        .coordinator
        .run(started.listeners, async move {
            let signal = signals.recv().await;
            tracing::info!(signal, "Shutdown signal received");
        })
        .await?;

    tracing::info!(
        elapsed_ms = report.elapsed.as_millis() as u64,
        open_connections = report.open_connections,
        "issuance-frontend exiting"
    );
    Ok(())
}
