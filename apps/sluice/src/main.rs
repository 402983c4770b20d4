//! # Sluice - Pull-Pipeline Driver
//!
//! The main binary for the sluice pull engine.
//!
//! This application assembles pipelines from `sluice-core` operators
//! and `sluice-io` adapters and drives them with the canonical loop:
//! poll the event loop, pull the terminal stage, repeat until the
//! status goes terminal.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  apps/sluice (THE BINARY)                │
//! │                                                          │
//! │   ┌────────────┐          ┌────────────────────────┐    │
//! │   │    CLI     │          │  poll/pull drive loop  │    │
//! │   │   (clap)   │─────────▶│  (owns the EventLoop)  │    │
//! │   └────────────┘          └───────────┬────────────┘    │
//! │                                       │                  │
//! │                    ┌──────────────────┼───────────────┐  │
//! │                    ▼                  ▼               │  │
//! │            ┌──────────────┐   ┌──────────────┐        │  │
//! │            │  sluice-io   │   │ sluice-core  │        │  │
//! │            │  (THE EDGE)  │──▶│ (THE LOGIC)  │        │  │
//! │            └──────────────┘   └──────────────┘        │  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Hex-dump a file through a pipeline
//! sluice hex Cargo.toml
//!
//! # Copy a file through source → sink
//! sluice copy in.bin out.bin
//!
//! # Echo server and a one-shot client
//! sluice echo-server --host 127.0.0.1 --port 7070
//! sluice send --host 127.0.0.1 --port 7070 "bounce me"
//! ```

mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // Initialize tracing — SLUICE_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("SLUICE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "sluice=debug"
    } else {
        "sluice=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
