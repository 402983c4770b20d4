//! # Sluice CLI Module
//!
//! This module implements the CLI interface for sluice.
//!
//! ## Available Commands
//!
//! - `hex` - Hex-dump a file through a source → hex-printer pipeline
//! - `copy` - Copy a file through a source → sink pipeline
//! - `echo-server` - Run a TCP echo server over accepted duplexes
//! - `send` - Send one message to a TCP server and print the reply

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::execute;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Sluice - Pull-Pipeline Driver
///
/// Pipelines that never block: every stage answers a pull immediately,
/// and asynchronous edges catch up through the polled event loop.
#[derive(Parser, Debug)]
#[command(name = "sluice")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Hex-dump a file to stdout
    Hex {
        /// Path to the file to dump
        file: PathBuf,
    },

    /// Copy a file through a source → sink pipeline
    Copy {
        /// Path to read from
        source: PathBuf,

        /// Path to write to (created or truncated)
        dest: PathBuf,
    },

    /// Run a TCP echo server
    EchoServer {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "7070")]
        port: u16,
    },

    /// Send one message to a TCP server and print the reply
    Send {
        /// Host to connect to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to connect to
        #[arg(short, long, default_value = "7070")]
        port: u16,

        /// The message to send
        message: String,
    },
}
