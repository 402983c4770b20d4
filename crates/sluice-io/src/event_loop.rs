//! # Event Loop
//!
//! The externally owned driver for every async adapter. One
//! current-thread tokio runtime plus a `LocalSet`; adapters spawn their
//! completion tasks onto it and the caller services it by calling
//! [`EventLoop::poll`] between pulls.
//!
//! There is no wake mechanism: a pull that finds nothing ready returns
//! `None`, and liveness depends entirely on the caller's poll cadence.
//! Completion tasks only ever run inside `poll`, which is what makes
//! the single-threaded `Rc<RefCell<_>>` adapter state sound: stage
//! pulls and completions can never overlap.

use std::future::Future;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};
use tokio::task::LocalSet;

use crate::error::IoError;

/// How long one `poll` may park waiting for I/O readiness. Long enough
/// to let the reactor deliver completions, short enough that a driving
/// loop stays responsive.
const POLL_BUDGET: Duration = Duration::from_millis(1);

// =============================================================================
// EVENT LOOP
// =============================================================================

/// Owner of the runtime and the adapter task set.
///
/// Passed by reference into every adapter factory — never implicit
/// global state — so the lifetime relationship is visible at the call
/// site: adapters outliving their loop observe `Err` on the next pull
/// instead of dangling.
pub struct EventLoop {
    runtime: Runtime,
    tasks: Rc<LocalSet>,
}

impl EventLoop {
    /// Build a loop over a fresh current-thread runtime.
    ///
    /// # Errors
    /// Returns `IoError::Setup` when the runtime cannot be created.
    pub fn new() -> Result<Self, IoError> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            runtime,
            tasks: Rc::new(LocalSet::new()),
        })
    }

    /// A cheap handle for adapters to spawn completion tasks with.
    #[must_use]
    pub fn handle(&self) -> LoopHandle {
        LoopHandle {
            tasks: Rc::downgrade(&self.tasks),
        }
    }

    /// Run one bounded, non-blocking iteration: drive spawned tasks and
    /// deliver pending I/O completions, then return. Call repeatedly,
    /// interleaved with pulls.
    pub fn poll(&self) {
        // The sleep is created inside the runtime so it binds to this
        // loop's timer driver.
        self.runtime.block_on(self.tasks.run_until(async {
            tokio::time::sleep(POLL_BUDGET).await;
        }));
    }

    /// Spawn a completion task directly on the loop.
    pub fn spawn(&self, task: impl Future<Output = ()> + 'static) {
        drop(self.tasks.spawn_local(task));
    }
}

impl core::fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventLoop").finish()
    }
}

// =============================================================================
// LOOP HANDLE
// =============================================================================

/// Weak reference to an [`EventLoop`], held by adapter state so
/// mid-stream operations (reads, writes, closes) can be issued from
/// inside a pull.
#[derive(Clone)]
pub struct LoopHandle {
    tasks: Weak<LocalSet>,
}

impl LoopHandle {
    /// Spawn a completion task. Returns `false` when the loop is gone,
    /// which adapters surface as `Status::Err` on the pull that needed
    /// it.
    pub fn spawn(&self, task: impl Future<Output = ()> + 'static) -> bool {
        match self.tasks.upgrade() {
            Some(tasks) => {
                drop(tasks.spawn_local(task));
                true
            }
            None => false,
        }
    }
}

impl core::fmt::Debug for LoopHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoopHandle")
            .field("alive", &(self.tasks.strong_count() > 0))
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn poll_drives_spawned_tasks() {
        let event_loop = EventLoop::new().expect("event loop");
        let ran = Rc::new(Cell::new(false));

        let flag = Rc::clone(&ran);
        event_loop.spawn(async move {
            flag.set(true);
        });

        assert!(!ran.get());
        event_loop.poll();
        assert!(ran.get());
    }

    #[test]
    fn dead_loop_refuses_spawns() {
        let handle = {
            let event_loop = EventLoop::new().expect("event loop");
            event_loop.handle()
        };
        assert!(!handle.spawn(async {}));
    }

    #[test]
    fn handle_spawns_while_loop_lives() {
        let event_loop = EventLoop::new().expect("event loop");
        let handle = event_loop.handle();
        let ran = Rc::new(Cell::new(false));

        let flag = Rc::clone(&ran);
        assert!(handle.spawn(async move {
            flag.set(true);
        }));

        event_loop.poll();
        assert!(ran.get());
    }
}
