//! One-shot source.

use crate::error::CoreError;
use crate::status::Status;
use crate::stream::{Link, Operator, Stream};
use crate::value::Value;

struct SingleValue {
    value: Option<Value>,
}

impl Operator for SingleValue {
    fn pull(&mut self, link: &mut Link<'_>, requested: Status) -> Option<Value> {
        if link.apply(requested).is_terminal() {
            return None;
        }

        match self.value.take() {
            Some(value) => Some(value),
            None => {
                link.apply(Status::Done);
                None
            }
        }
    }
}

/// Source that emits a copy of `data` once, then reports `Done`.
///
/// # Errors
/// Returns `CoreError::InvalidArgument` for empty input.
pub fn single_value(data: &[u8]) -> Result<Stream, CoreError> {
    if data.is_empty() {
        return Err(CoreError::InvalidArgument("data"));
    }

    Ok(Stream::new(SingleValue {
        value: Some(Value::from_bytes(data.to_vec())),
    }))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(
            single_value(b"").err(),
            Some(CoreError::InvalidArgument("data"))
        );
    }

    #[test]
    fn emits_once_then_done() {
        let mut source = single_value(b"payload").expect("source");

        let value = source.pull(Status::Ok).expect("value");
        assert_eq!(value.bytes(), Some(b"payload".as_slice()));
        assert_eq!(source.status(), Status::Ok);

        assert!(source.pull(Status::Ok).is_none());
        assert_eq!(source.status(), Status::Done);

        assert!(source.pull(Status::Ok).is_none());
        assert_eq!(source.status(), Status::Done);
    }

    #[test]
    fn err_request_discards_the_value() {
        let mut source = single_value(b"payload").expect("source");
        assert!(source.pull(Status::Err).is_none());
        assert_eq!(source.status(), Status::Err);
        assert!(source.pull(Status::Ok).is_none());
    }
}
