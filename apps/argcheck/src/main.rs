//! # argcheck
//!
//! Validate argument graphs from the command line.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                 apps/argcheck (THE BINARY)                 │
//! │                                                            │
//! │  ┌─────────────┐    ┌─────────────┐    ┌───────────────┐   │
//! │  │   CLI       │    │   Loader    │    │ Source Probe  │   │
//! │  │  (clap)     │    │ (JSON/YAML) │    │  (reqwest)    │   │
//! │  └──────┬──────┘    └──────┬──────┘    └───────┬───────┘   │
//! │         │                  │                   │           │
//! │         └──────────────────┼───────────────────┘           │
//! │                            ▼                               │
//! │                   ┌─────────────────┐                      │
//! │                   │  argcheck-core  │                      │
//! │                   │  (THE ENGINE)   │                      │
//! │                   └─────────────────┘                      │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! argcheck check arguments.yaml
//! argcheck check export.json --no-schema --tolerance 0.02
//! argcheck check arguments.yaml --check-urls
//! argcheck crux arguments.yaml
//! cat arguments.yaml | argcheck summary -
//! ```
//!
//! Exit status: `0` passed, `1` issues found, `2` unreadable input or bad
//! configuration, `3` schema unavailable.

use argcheck::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // ARGCHECK_LOG_FORMAT=json enables machine-parseable output.
    // Logs go to stderr; stdout carries only the report.
    let log_format = std::env::var("ARGCHECK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "argcheck=warn".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    let code = match cli::execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Error: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}
