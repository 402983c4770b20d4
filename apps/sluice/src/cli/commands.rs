//! # CLI Command Implementations
//!
//! Every command is the same shape: assemble a pipeline, then drive it
//! with the poll/pull loop until its status goes terminal.

use crate::cli::{Cli, Commands};
use sluice_core::{CoreError, Status, Stream, Value, ops, pipeline};
use sluice_io::{EventLoop, IoError, file_sink, file_source, tcp_client, tcp_server};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

// =============================================================================
// ERROR TYPE
// =============================================================================

/// Errors surfaced to the top-level dispatcher.
#[derive(Debug, Error)]
pub enum AppError {
    /// Pipeline assembly failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Event loop or adapter construction failed.
    #[error(transparent)]
    Io(#[from] IoError),

    /// A driven pipeline ended in `Err` instead of `Done`.
    #[error("Pipeline failed: {0}")]
    Failed(&'static str),
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Execute the parsed command line.
pub fn execute(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Commands::Hex { file } => run_hex(file),
        Commands::Copy { source, dest } => run_copy(source, dest),
        Commands::EchoServer { host, port } => run_echo_server(&host, port),
        Commands::Send {
            host,
            port,
            message,
        } => run_send(&host, port, &message),
    }
}

/// Poll-and-pull until the terminal stage leaves `Ok`, handing every
/// emitted value to `on_value`. The driver owns (and here, drops) any
/// value the pipeline did not forward further.
fn drive(
    event_loop: &EventLoop,
    chain: &mut Stream,
    mut on_value: impl FnMut(Value),
) -> Status {
    loop {
        event_loop.poll();
        match chain.pull(Status::Ok) {
            Some(value) => on_value(value),
            None => {
                if chain.status().is_terminal() {
                    return chain.status();
                }
            }
        }
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

fn run_hex(file: PathBuf) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let source = file_source(file, &event_loop)?;
    let mut chain = pipeline([source, ops::hex_printer(std::io::stdout())])?;

    match drive(&event_loop, &mut chain, |_value| {}) {
        Status::Done => Ok(()),
        _ => Err(AppError::Failed("hex dump")),
    }
}

fn run_copy(source: PathBuf, dest: PathBuf) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let from = file_source(source, &event_loop)?;
    let to = file_sink(dest, &event_loop)?;
    let mut chain = pipeline([from, to])?;

    match drive(&event_loop, &mut chain, |_value| {}) {
        Status::Done => {
            info!("copy complete");
            Ok(())
        }
        _ => Err(AppError::Failed("copy")),
    }
}

fn run_echo_server(host: &str, port: u16) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let (mut server, handle) = tcp_server(host, port, &event_loop)?;
    let mut echoes: Vec<Stream> = Vec::new();
    let mut announced = false;

    while server.status() == Status::Ok {
        event_loop.poll();

        if !announced {
            if let Some(addr) = handle.local_addr() {
                info!(%addr, "echo server listening");
                announced = true;
            }
        }

        if let Some(value) = server.pull(Status::Ok) {
            if let Some(mut duplex) = value.into_conn() {
                if let (Some(source), Some(mut sink)) =
                    (duplex.take_source(), duplex.take_sink())
                {
                    sink.set_source(source);
                    echoes.push(sink);
                    info!(clients = echoes.len(), "client connected");
                }
            }
        }

        for echo in &mut echoes {
            let _ = echo.pull(Status::Ok);
        }
        let before = echoes.len();
        echoes.retain(|echo| echo.status() == Status::Ok);
        if echoes.len() < before {
            debug!(clients = echoes.len(), "client finished");
        }
    }

    // The accept loop only exits when the listener itself failed.
    Err(AppError::Failed("echo server"))
}

fn run_send(host: &str, port: u16, message: &str) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut client = tcp_client(host, port, &event_loop)?;

    let payload = ops::single_value(message.as_bytes())?;
    let mut sink = client.take_sink().ok_or(AppError::Failed("client sink"))?;
    sink.set_source(payload);

    let source = client.take_source().ok_or(AppError::Failed("client source"))?;
    let limiter = ops::taker(1, Status::Done)?;
    let mut reply = pipeline([source, limiter, ops::collector()])?;

    loop {
        event_loop.poll();
        let _ = sink.pull(Status::Ok);

        if let Some(value) = reply.pull(Status::Ok) {
            if let Some(bytes) = value.into_bytes() {
                println!("{}", String::from_utf8_lossy(&bytes));
            }
            return Ok(());
        }
        if reply.status().is_terminal() || sink.status() == Status::Err {
            return Err(AppError::Failed("send"));
        }
    }
}
