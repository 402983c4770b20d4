//! Limiting through stream: let `n` values pass, then terminate.

use crate::error::CoreError;
use crate::status::Status;
use crate::stream::{Link, Operator, Stream};
use crate::value::Value;

struct Taker {
    remaining: u64,
    terminal: Status,
}

impl Operator for Taker {
    fn pull(&mut self, link: &mut Link<'_>, requested: Status) -> Option<Value> {
        if self.remaining == 0 {
            // Force the chosen terminal status through the pipeline.
            link.apply(self.terminal);
            return None;
        }

        self.remaining -= 1;
        link.pull_source(requested)
    }
}

/// Forwards up to `n` upstream pulls unchanged, then drives the whole
/// pipeline to `terminal` and returns nothing from then on. `n = 0`
/// terminates without forwarding anything.
///
/// # Errors
/// Returns `CoreError::InvalidArgument` unless `terminal` is `Err` or
/// `Done`.
pub fn taker(n: u64, terminal: Status) -> Result<Stream, CoreError> {
    if !terminal.is_terminal() {
        return Err(CoreError::InvalidArgument("terminal status"));
    }

    Ok(Stream::new(Taker {
        remaining: n,
        terminal,
    }))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::counter;
    use crate::pipeline::pipeline;

    #[test]
    fn ok_is_not_a_terminal_status() {
        assert_eq!(
            taker(3, Status::Ok).err(),
            Some(CoreError::InvalidArgument("terminal status"))
        );
    }

    #[test]
    fn unwired_taker_errors() {
        let mut lone = taker(5, Status::Done).expect("taker");
        assert!(lone.pull(Status::Ok).is_none());
        assert_eq!(lone.status(), Status::Err);
    }

    #[test]
    fn take_one_then_done() {
        let limiter = taker(1, Status::Done).expect("taker");
        let mut chain = pipeline([counter(), limiter]).expect("pipeline");

        // First read is good.
        let value = chain.pull(Status::Ok).expect("value");
        assert_eq!(value.bytes(), Some(0u64.to_le_bytes().as_slice()));

        // Second read terminates the taker and its source.
        assert!(chain.pull(Status::Ok).is_none());
        assert_eq!(chain.status(), Status::Done);
        assert_eq!(chain.source().map(Stream::status), Some(Status::Done));
    }

    #[test]
    fn take_one_then_err() {
        let limiter = taker(1, Status::Err).expect("taker");
        let mut chain = pipeline([counter(), limiter]).expect("pipeline");

        assert!(chain.pull(Status::Ok).is_some());
        assert!(chain.pull(Status::Ok).is_none());
        assert_eq!(chain.status(), Status::Err);
        assert_eq!(chain.source().map(Stream::status), Some(Status::Err));
    }

    #[test]
    fn zero_budget_terminates_immediately() {
        let limiter = taker(0, Status::Done).expect("taker");
        let mut chain = pipeline([counter(), limiter]).expect("pipeline");

        assert!(chain.pull(Status::Ok).is_none());
        assert_eq!(chain.status(), Status::Done);
        assert_eq!(chain.source().map(Stream::status), Some(Status::Done));
    }
}
