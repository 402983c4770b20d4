//! # TCP Adapters
//!
//! A client duplex (connect-side) and a listener stream (accept-side)
//! over the event loop. The client's sink half writes queued values
//! with the same one-in-flight discipline as the file sink; its source
//! half surfaces received bytes as values once read completions fire.
//! The listener emits each accepted connection as a value wrapping a
//! freshly built duplex.

use std::cell::RefCell;
use std::net::{IpAddr, SocketAddr};
use std::rc::Rc;

use sluice_core::{Duplex, Link, Operator, Status, Stream, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, warn};

use crate::error::IoError;
use crate::event_loop::{EventLoop, LoopHandle};
use crate::inflight::Inflight;

/// Bytes requested per asynchronous socket read.
const READ_CHUNK: usize = 32 * 1024;

// =============================================================================
// CLIENT STATE
// =============================================================================

/// Shared state of one connection, reachable from both duplex halves
/// and from the completion tasks. Single-threaded: pulls and
/// completions never overlap, so `RefCell` borrows stay disjoint.
struct ClientState {
    loop_handle: LoopHandle,
    /// True until the connect (or accept handoff) completes.
    connecting: bool,
    reader: Option<OwnedReadHalf>,
    writer: Option<OwnedWriteHalf>,
    read: Inflight<Vec<u8>>,
    /// Peer closed its write direction; the source half is finished.
    read_eof: bool,
    write: Inflight<std::io::Result<()>>,
    shutdown: Inflight<std::io::Result<()>>,
    shutdown_complete: bool,
    failed: bool,
}

// =============================================================================
// SINK HALF
// =============================================================================

struct TcpSink {
    state: Rc<RefCell<ClientState>>,
}

impl Operator for TcpSink {
    fn pull(&mut self, link: &mut Link<'_>, requested: Status) -> Option<Value> {
        if link.status().is_terminal() || requested.is_terminal() {
            link.apply(requested);
            return None;
        }
        if !link.has_source() {
            link.apply(Status::Err);
            return None;
        }

        let mut state = self.state.borrow_mut();
        if state.failed {
            drop(state);
            link.apply(Status::Err);
            return None;
        }

        if let Some(outcome) = state.write.take_ready() {
            if let Err(error) = outcome {
                warn!(%error, "tcp write failed");
                state.failed = true;
                drop(state);
                link.apply(Status::Err);
                return None;
            }
        }

        if state.shutdown_complete {
            drop(state);
            link.apply(Status::Done);
            return None;
        }
        // Waiting for the connection.
        if state.connecting {
            return None;
        }
        // Still writing the previous packet.
        if state.write.is_pending() {
            return None;
        }
        // Write direction going down: status stays Ok until it lands.
        if state.shutdown.is_pending() {
            return None;
        }
        if let Some(outcome) = state.shutdown.take_ready() {
            state.shutdown_complete = true;
            drop(state);
            match outcome {
                Ok(()) => {
                    link.apply(Status::Done);
                }
                Err(error) => {
                    warn!(%error, "tcp shutdown failed");
                    link.apply(Status::Err);
                }
            }
            return None;
        }

        // End the state borrow before pulling upstream: an echo wiring
        // may route the pull back into this connection's source half.
        drop(state);
        let value = link.pull_source(Status::Ok);

        if link.status().is_terminal() {
            if link.status() == Status::Err {
                return None;
            }
            // Upstream finished: drain a final value if one rode along
            // with the completion, then shut the write direction down,
            // holding Ok until the shutdown completes.
            link.force_status(Status::Ok);
            let mut state = self.state.borrow_mut();
            if let Some(last) = value.and_then(Value::into_bytes) {
                issue_socket_write(&self.state, &mut state, last);
            } else {
                issue_shutdown(&self.state, &mut state);
            }
            return None;
        }

        let Some(value) = value else {
            return None;
        };
        let Some(bytes) = value.into_bytes() else {
            link.apply(Status::Err);
            return None;
        };

        let mut state = self.state.borrow_mut();
        issue_socket_write(&self.state, &mut state, bytes);
        None
    }
}

fn issue_socket_write(shared: &Rc<RefCell<ClientState>>, state: &mut ClientState, bytes: Vec<u8>) {
    let Some(mut writer) = state.writer.take() else {
        state.failed = true;
        return;
    };
    state.write = Inflight::Pending;

    let shared = Rc::clone(shared);
    let spawned = state.loop_handle.spawn(async move {
        let outcome = writer.write_all(&bytes).await;
        let mut state = shared.borrow_mut();
        if outcome.is_ok() {
            state.writer = Some(writer);
        }
        state.write = Inflight::Ready(outcome);
    });
    if !spawned {
        state.failed = true;
    }
}

fn issue_shutdown(shared: &Rc<RefCell<ClientState>>, state: &mut ClientState) {
    if state.shutdown.is_pending() {
        return;
    }
    let Some(mut writer) = state.writer.take() else {
        state.shutdown_complete = true;
        return;
    };
    state.shutdown = Inflight::Pending;

    let shared = Rc::clone(shared);
    let spawned = state.loop_handle.spawn(async move {
        let outcome = writer.shutdown().await;
        drop(writer);
        shared.borrow_mut().shutdown = Inflight::Ready(outcome);
    });
    if !spawned {
        state.failed = true;
    }
}

// =============================================================================
// SOURCE HALF
// =============================================================================

struct TcpSource {
    state: Rc<RefCell<ClientState>>,
}

impl Operator for TcpSource {
    fn pull(&mut self, link: &mut Link<'_>, requested: Status) -> Option<Value> {
        if link.apply(requested).is_terminal() {
            return None;
        }

        let mut state = self.state.borrow_mut();
        if state.failed {
            drop(state);
            link.apply(Status::Err);
            return None;
        }

        if let Some(bytes) = state.read.take_ready() {
            return Some(Value::from_bytes(bytes));
        }

        if state.read_eof {
            drop(state);
            link.apply(Status::Done);
            return None;
        }
        // Waiting for the connection.
        if state.connecting {
            return None;
        }

        if !state.read.is_pending() {
            issue_socket_read(&self.state, &mut state);
        }
        None
    }
}

fn issue_socket_read(shared: &Rc<RefCell<ClientState>>, state: &mut ClientState) {
    let Some(mut reader) = state.reader.take() else {
        return;
    };
    state.read = Inflight::Pending;

    let shared = Rc::clone(shared);
    let spawned = state.loop_handle.spawn(async move {
        let mut buffer = vec![0u8; READ_CHUNK];
        let outcome = reader.read(&mut buffer).await;

        let mut state = shared.borrow_mut();
        match outcome {
            Ok(0) => {
                state.read = Inflight::Idle;
                state.read_eof = true;
            }
            Ok(n) => {
                buffer.truncate(n);
                state.reader = Some(reader);
                state.read = Inflight::Ready(buffer);
            }
            Err(error) => {
                debug!(%error, "tcp read failed");
                state.failed = true;
            }
        }
    });
    if !spawned {
        state.failed = true;
    }
}

// =============================================================================
// CLIENT FACTORIES
// =============================================================================

fn duplex_over(state: Rc<RefCell<ClientState>>) -> Duplex {
    Duplex::from_halves(
        Stream::new(TcpSink {
            state: Rc::clone(&state),
        }),
        Stream::new(TcpSource { state }),
    )
}

fn fresh_state(loop_handle: LoopHandle, connecting: bool) -> ClientState {
    ClientState {
        loop_handle,
        connecting,
        reader: None,
        writer: None,
        read: Inflight::Idle,
        read_eof: false,
        write: Inflight::Idle,
        shutdown: Inflight::Idle,
        shutdown_complete: false,
        failed: false,
    }
}

/// Duplex over an outbound TCP connection.
///
/// The connect is issued immediately; both halves return nothing until
/// it completes. Connection failure surfaces as `Err` on the next pull
/// of either half.
///
/// # Errors
/// Returns `IoError::InvalidArgument` when `host` is not an IP address
/// literal.
pub fn tcp_client(host: &str, port: u16, event_loop: &EventLoop) -> Result<Duplex, IoError> {
    let host: IpAddr = host
        .parse()
        .map_err(|_| IoError::InvalidArgument("host"))?;
    let addr = SocketAddr::new(host, port);

    let state = Rc::new(RefCell::new(fresh_state(event_loop.handle(), true)));

    let shared = Rc::clone(&state);
    event_loop.spawn(async move {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                let (reader, writer) = stream.into_split();
                let mut state = shared.borrow_mut();
                state.connecting = false;
                state.reader = Some(reader);
                state.writer = Some(writer);
            }
            Err(error) => {
                debug!(%addr, %error, "tcp connect failed");
                let mut state = shared.borrow_mut();
                state.connecting = false;
                state.failed = true;
            }
        }
    });

    Ok(duplex_over(state))
}

/// Duplex over an already-accepted connection (the listener's emit
/// path).
fn tcp_client_from_stream(stream: TcpStream, loop_handle: LoopHandle) -> Duplex {
    let (reader, writer) = stream.into_split();
    let mut state = fresh_state(loop_handle, false);
    state.reader = Some(reader);
    state.writer = Some(writer);
    duplex_over(Rc::new(RefCell::new(state)))
}

// =============================================================================
// LISTENER
// =============================================================================

struct ServerState {
    loop_handle: LoopHandle,
    listener: Option<TcpListener>,
    local_addr: Option<SocketAddr>,
    accept: Inflight<TcpStream>,
    failed: bool,
}

struct TcpServer {
    state: Rc<RefCell<ServerState>>,
}

impl Operator for TcpServer {
    fn pull(&mut self, link: &mut Link<'_>, requested: Status) -> Option<Value> {
        if link.apply(requested).is_terminal() {
            return None;
        }

        let mut state = self.state.borrow_mut();
        if state.failed {
            drop(state);
            link.apply(Status::Err);
            return None;
        }

        if let Some(stream) = state.accept.take_ready() {
            let duplex = tcp_client_from_stream(stream, state.loop_handle.clone());
            return Some(Value::from_conn(duplex));
        }

        if state.listener.is_some() && !state.accept.is_pending() {
            issue_accept(&self.state, &mut state);
        }
        None
    }
}

fn issue_accept(shared: &Rc<RefCell<ServerState>>, state: &mut ServerState) {
    let Some(listener) = state.listener.take() else {
        return;
    };
    state.accept = Inflight::Pending;

    let shared = Rc::clone(shared);
    let spawned = state.loop_handle.spawn(async move {
        let outcome = listener.accept().await;
        let mut state = shared.borrow_mut();
        state.listener = Some(listener);
        match outcome {
            Ok((stream, peer)) => {
                debug!(%peer, "accepted connection");
                state.accept = Inflight::Ready(stream);
            }
            Err(error) => {
                warn!(%error, "tcp accept failed");
                state.accept = Inflight::Idle;
                state.failed = true;
            }
        }
    });
    if !spawned {
        state.failed = true;
    }
}

// =============================================================================
// LISTENER HANDLE
// =============================================================================

/// Observer side of a [`tcp_server`] stage.
#[derive(Clone)]
pub struct TcpServerHandle {
    state: Rc<RefCell<ServerState>>,
}

impl TcpServerHandle {
    /// The bound address, once the asynchronous bind has completed.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.state.borrow().local_addr
    }
}

/// Listener stage: each pull with an accepted connection pending emits
/// a value wrapping a freshly built client duplex; the caller wires
/// and polls it. Bind and listen failures surface as `Err` on pull.
///
/// # Errors
/// Returns `IoError::InvalidArgument` when `host` is not an IP address
/// literal or `port` is 0.
pub fn tcp_server(
    host: &str,
    port: u16,
    event_loop: &EventLoop,
) -> Result<(Stream, TcpServerHandle), IoError> {
    let host: IpAddr = host
        .parse()
        .map_err(|_| IoError::InvalidArgument("host"))?;
    if port == 0 {
        return Err(IoError::InvalidArgument("port"));
    }
    let addr = SocketAddr::new(host, port);

    let state = Rc::new(RefCell::new(ServerState {
        loop_handle: event_loop.handle(),
        listener: None,
        local_addr: None,
        accept: Inflight::Idle,
        failed: false,
    }));

    let shared = Rc::clone(&state);
    event_loop.spawn(async move {
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                let mut state = shared.borrow_mut();
                state.local_addr = listener.local_addr().ok();
                state.listener = Some(listener);
            }
            Err(error) => {
                warn!(%addr, %error, "tcp bind failed");
                shared.borrow_mut().failed = true;
            }
        }
    });

    let stream = Stream::new(TcpServer {
        state: Rc::clone(&state),
    });
    Ok((stream, TcpServerHandle { state }))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_host_literals_are_rejected() {
        let event_loop = EventLoop::new().expect("event loop");
        assert!(matches!(
            tcp_client("not-an-ip", 4000, &event_loop),
            Err(IoError::InvalidArgument("host"))
        ));
        assert!(matches!(
            tcp_server("hello", 4000, &event_loop),
            Err(IoError::InvalidArgument("host"))
        ));
    }

    #[test]
    fn port_zero_is_rejected_for_servers() {
        let event_loop = EventLoop::new().expect("event loop");
        assert!(matches!(
            tcp_server("127.0.0.1", 0, &event_loop),
            Err(IoError::InvalidArgument("port"))
        ));
    }

    #[test]
    fn refused_connection_errors_on_pull() {
        let event_loop = EventLoop::new().expect("event loop");

        // Grab a port nothing is listening on.
        let port = {
            let probe = std::net::TcpListener::bind("127.0.0.1:0").expect("probe bind");
            probe.local_addr().expect("probe addr").port()
        };

        let mut client = tcp_client("127.0.0.1", port, &event_loop).expect("client");
        assert_eq!(client.status(), Status::Ok);

        let mut sentinel = 1000;
        loop {
            event_loop.poll();
            if let Some(source) = client.source_mut() {
                let _ = source.pull(Status::Ok);
            }
            if client.apply_status(Status::Ok).is_terminal() || sentinel == 0 {
                break;
            }
            sentinel -= 1;
        }

        assert!(sentinel > 0);
        assert_eq!(client.status(), Status::Err);
    }
}
