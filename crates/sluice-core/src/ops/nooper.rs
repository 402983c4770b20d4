//! The smallest possible through stream.

use crate::status::Status;
use crate::stream::{Link, Operator, Stream};
use crate::value::Value;

struct Nooper;

impl Operator for Nooper {
    fn pull(&mut self, link: &mut Link<'_>, requested: Status) -> Option<Value> {
        link.pull_source(requested)
    }
}

/// Pass-through stage. Exists to exercise status propagation: errors
/// and completion cross a chain of these in both directions.
#[must_use]
pub fn nooper() -> Stream {
    Stream::new(Nooper)
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
    fn error_propagates_downstream_when_unwired() {
        // Three no-ops, innermost never gets a source.
        let mut chain =
            pipeline([nooper(), nooper(), nooper()]).expect("pipeline");

        assert!(chain.pull(Status::Ok).is_none());

        assert_eq!(chain.status(), Status::Err);
        let middle = chain.source().expect("middle");
        assert_eq!(middle.status(), Status::Err);
        let innermost = middle.source().expect("innermost");
        assert_eq!(innermost.status(), Status::Err);
    }

    #[test]
    fn error_propagates_upstream() {
        let mut chain =
            pipeline([counter(), nooper(), nooper(), nooper()]).expect("pipeline");

        // A healthy pull leaves every stage Ok.
        assert!(chain.pull(Status::Ok).is_some());
        assert_eq!(chain.status(), Status::Ok);

        // Driving the terminal stage with Err reaches the counter.
        assert!(chain.pull(Status::Err).is_none());

        let mut stage = Some(&chain);
        while let Some(current) = stage {
            assert_eq!(current.status(), Status::Err);
            stage = current.source();
        }
    }

    #[test]
    fn values_pass_through_untouched() {
        let mut chain = pipeline([counter(), nooper()]).expect("pipeline");
        let value = chain.pull(Status::Ok).expect("value");
        assert_eq!(value.bytes(), Some(0u64.to_le_bytes().as_slice()));
    }
}
