//! # File Adapters
//!
//! Pull stages over asynchronous file I/O. Opens, reads, writes, and
//! closes are all issued as completion tasks on the event loop; a pull
//! only ever hands over a result that already landed, or kicks off the
//! next operation and returns nothing.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use sluice_core::{Link, Operator, Status, Stream, Value};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};

use crate::error::IoError;
use crate::event_loop::{EventLoop, LoopHandle};
use crate::inflight::Inflight;

/// Bytes requested per asynchronous read.
const READ_CHUNK: usize = 32 * 1024;

// =============================================================================
// FILE SOURCE
// =============================================================================

struct SourceState {
    loop_handle: LoopHandle,
    /// Present when the file is open and no operation holds it.
    file: Option<File>,
    read: Inflight<Vec<u8>>,
    closed: bool,
    failed: bool,
}

struct FileSource {
    state: Rc<RefCell<SourceState>>,
}

impl Operator for FileSource {
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
        if state.closed {
            drop(state);
            link.apply(Status::Done);
            return None;
        }

        // Deliver the completed read, if one landed since last pull.
        if let Some(bytes) = state.read.take_ready() {
            return Some(Value::from_bytes(bytes));
        }

        // Nothing buffered: issue the next read unless one is already
        // in flight or the open has not completed yet.
        if !state.read.is_pending() {
            issue_file_read(&self.state, &mut state);
        }
        None
    }
}

fn issue_file_read(shared: &Rc<RefCell<SourceState>>, state: &mut SourceState) {
    let Some(mut file) = state.file.take() else {
        return;
    };
    state.read = Inflight::Pending;

    let shared = Rc::clone(shared);
    let spawned = state.loop_handle.spawn(async move {
        let mut buffer = vec![0u8; READ_CHUNK];
        let outcome = file.read(&mut buffer).await;

        let mut state = shared.borrow_mut();
        match outcome {
            // End of file: close and finish.
            Ok(0) => {
                drop(file);
                state.read = Inflight::Idle;
                state.closed = true;
            }
            Ok(n) => {
                buffer.truncate(n);
                state.file = Some(file);
                state.read = Inflight::Ready(buffer);
            }
            Err(error) => {
                warn!(%error, "file source read failed");
                state.failed = true;
            }
        }
    });
    if !spawned {
        state.failed = true;
    }
}

/// Source stage over an asynchronously opened file.
///
/// Pulls return nothing until the open completes, then one 32 KiB-or-
/// smaller chunk per completed read. End of file closes the handle and
/// reports `Done`; any I/O failure reports `Err`.
///
/// # Errors
/// Returns `IoError::InvalidArgument` for an empty path.
pub fn file_source(path: impl Into<PathBuf>, event_loop: &EventLoop) -> Result<Stream, IoError> {
    let path = path.into();
    if path.as_os_str().is_empty() {
        return Err(IoError::InvalidArgument("path"));
    }

    let state = Rc::new(RefCell::new(SourceState {
        loop_handle: event_loop.handle(),
        file: None,
        read: Inflight::Idle,
        closed: false,
        failed: false,
    }));

    let shared = Rc::clone(&state);
    event_loop.spawn(async move {
        match File::open(&path).await {
            Ok(file) => {
                shared.borrow_mut().file = Some(file);
            }
            Err(error) => {
                debug!(path = %path.display(), %error, "file source open failed");
                shared.borrow_mut().failed = true;
            }
        }
    });

    Ok(Stream::new(FileSource { state }))
}

// =============================================================================
// FILE SINK
// =============================================================================

struct SinkState {
    loop_handle: LoopHandle,
    /// False once the create/truncate open completed.
    opening: bool,
    file: Option<File>,
    write: Inflight<std::io::Result<()>>,
    close: Inflight<std::io::Result<()>>,
    closed: bool,
    failed: bool,
}

struct FileSink {
    state: Rc<RefCell<SinkState>>,
}

impl Operator for FileSink {
    fn pull(&mut self, link: &mut Link<'_>, requested: Status) -> Option<Value> {
        // Explicit terminal requests and already-terminal stages short
        // circuit before any adapter state is touched.
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

        // Harvest the previous write before considering new work.
        if let Some(outcome) = state.write.take_ready() {
            if let Err(error) = outcome {
                warn!(%error, "file sink write failed");
                state.failed = true;
                drop(state);
                link.apply(Status::Err);
                return None;
            }
        }

        if state.closed {
            drop(state);
            link.apply(Status::Done);
            return None;
        }
        // Not open yet.
        if state.opening {
            return None;
        }
        // Still writing the previous packet.
        if state.write.is_pending() {
            return None;
        }
        // Close in progress: status stays Ok until it lands.
        if state.close.is_pending() {
            return None;
        }
        if let Some(outcome) = state.close.take_ready() {
            state.closed = true;
            drop(state);
            match outcome {
                Ok(()) => {
                    link.apply(Status::Done);
                }
                Err(error) => {
                    warn!(%error, "file sink close failed");
                    link.apply(Status::Err);
                }
            }
            return None;
        }

        // State borrow must end before pulling upstream; a wired
        // adapter chain may re-enter this shared state.
        drop(state);
        let value = link.pull_source(Status::Ok);

        if link.status().is_terminal() {
            if link.status() == Status::Err {
                return None;
            }
            // Upstream Done: drain a final value if one rode along with
            // the completion, then flush and close, holding Ok until
            // the close callback fires.
            link.force_status(Status::Ok);
            let mut state = self.state.borrow_mut();
            if let Some(last) = value.and_then(Value::into_bytes) {
                issue_file_write(&self.state, &mut state, last);
            } else {
                issue_file_close(&self.state, &mut state);
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
        issue_file_write(&self.state, &mut state, bytes);
        None
    }
}

fn issue_file_write(shared: &Rc<RefCell<SinkState>>, state: &mut SinkState, bytes: Vec<u8>) {
    let Some(mut file) = state.file.take() else {
        state.failed = true;
        return;
    };
    state.write = Inflight::Pending;

    let shared = Rc::clone(shared);
    let spawned = state.loop_handle.spawn(async move {
        let outcome = file.write_all(&bytes).await;
        let mut state = shared.borrow_mut();
        state.file = Some(file);
        state.write = Inflight::Ready(outcome);
    });
    if !spawned {
        state.failed = true;
    }
}

fn issue_file_close(shared: &Rc<RefCell<SinkState>>, state: &mut SinkState) {
    if state.close.is_pending() {
        return;
    }
    let Some(mut file) = state.file.take() else {
        state.closed = true;
        return;
    };
    state.close = Inflight::Pending;

    let shared = Rc::clone(shared);
    let spawned = state.loop_handle.spawn(async move {
        let outcome = file.flush().await;
        drop(file);
        shared.borrow_mut().close = Inflight::Ready(outcome);
    });
    if !spawned {
        state.failed = true;
    }
}

/// Sink stage writing its upstream's bytes to a created/truncated file.
///
/// Buffers at most one in-flight write; a pull while one is
/// outstanding is a no-op. On upstream `Err`/`Done` with nothing
/// buffered it flushes and closes, reporting `Done` once the close
/// completes. Pulling with no source wired reports `Err`.
///
/// # Errors
/// Returns `IoError::InvalidArgument` for an empty path.
pub fn file_sink(path: impl Into<PathBuf>, event_loop: &EventLoop) -> Result<Stream, IoError> {
    let path = path.into();
    if path.as_os_str().is_empty() {
        return Err(IoError::InvalidArgument("path"));
    }

    let state = Rc::new(RefCell::new(SinkState {
        loop_handle: event_loop.handle(),
        opening: true,
        file: None,
        write: Inflight::Idle,
        close: Inflight::Idle,
        closed: false,
        failed: false,
    }));

    let shared = Rc::clone(&state);
    event_loop.spawn(async move {
        match File::create(&path).await {
            Ok(file) => {
                let mut state = shared.borrow_mut();
                state.opening = false;
                state.file = Some(file);
            }
            Err(error) => {
                debug!(path = %path.display(), %error, "file sink open failed");
                let mut state = shared.borrow_mut();
                state.opening = false;
                state.failed = true;
            }
        }
    });

    Ok(Stream::new(FileSink { state }))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_paths_are_rejected() {
        let event_loop = EventLoop::new().expect("event loop");
        assert!(matches!(
            file_source("", &event_loop),
            Err(IoError::InvalidArgument("path"))
        ));
        assert!(matches!(
            file_sink("", &event_loop),
            Err(IoError::InvalidArgument("path"))
        ));
    }

    #[test]
    fn missing_file_errors_on_pull() {
        let event_loop = EventLoop::new().expect("event loop");
        let mut source =
            file_source("/definitely/not/a/real/path.bin", &event_loop).expect("source");

        let mut sentinel = 100;
        while source.status() == Status::Ok && sentinel > 0 {
            event_loop.poll();
            assert!(source.pull(Status::Ok).is_none());
            sentinel -= 1;
        }
        assert_eq!(source.status(), Status::Err);
    }

    #[test]
    fn sink_without_source_errors() {
        let event_loop = EventLoop::new().expect("event loop");
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sink = file_sink(dir.path().join("out.bin"), &event_loop).expect("sink");

        assert!(sink.pull(Status::Ok).is_none());
        assert_eq!(sink.status(), Status::Err);
    }

    #[test]
    fn dropped_loop_surfaces_as_err() {
        let event_loop = EventLoop::new().expect("event loop");
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("in.bin");
        std::fs::write(&path, b"data").expect("write fixture");

        let mut source = file_source(&path, &event_loop).expect("source");

        // Drive until the first chunk lands, so the file handle is open
        // and idle.
        let mut first = None;
        let mut sentinel = 1000;
        while first.is_none() && sentinel > 0 {
            event_loop.poll();
            first = source.pull(Status::Ok);
            sentinel -= 1;
        }
        assert_eq!(
            first.expect("first chunk").bytes(),
            Some(b"data".as_slice())
        );

        drop(event_loop);

        // The next read cannot be issued; the failure surfaces on the
        // following pull.
        assert!(source.pull(Status::Ok).is_none());
        assert!(source.pull(Status::Ok).is_none());
        assert_eq!(source.status(), Status::Err);
    }
}
