//! Decoded frames and chunk payload parsing.

use pi_types::{FrameDecodeError, PointCandidate};
use serde_json::Value;

/// Payload of the push-variant end-of-stream frame.
pub const DONE_SENTINEL: &str = "[DONE]";

/// One complete unit pulled off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A chunk payload, still JSON text.
    Chunk(String),
    /// No further chunks will arrive.
    Done,
}

/// Parse a chunk payload into untrusted point candidates.
///
/// The payload must be a JSON array. Its elements are not shape-checked here;
/// that is the consumer's per-point policy.
pub fn decode_chunk(payload: &str) -> Result<Vec<PointCandidate>, FrameDecodeError> {
    match serde_json::from_str::<Value>(payload)? {
        Value::Array(items) => Ok(items.into_iter().map(PointCandidate::new).collect()),
        other => Err(FrameDecodeError::NotAnArray(truncate(other.to_string()))),
    }
}

fn truncate(mut s: String) -> String {
    const MAX: usize = 64;
    if s.len() > MAX {
        let mut end = MAX;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
        s.push('…');
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_array_of_points() {
        let cands = decode_chunk(r#"[{"x":0.1,"y":0.2},{"x":"a","y":1}]"#).unwrap();
        assert_eq!(cands.len(), 2);
        assert!(cands[0].validate().is_ok());
        assert!(cands[1].validate().is_err());
    }

    #[test]
    fn empty_array_is_valid() {
        assert!(decode_chunk("[]").unwrap().is_empty());
    }

    #[test]
    fn object_payload_is_not_an_array() {
        assert!(matches!(
            decode_chunk(r#"{"x":0.1}"#),
            Err(FrameDecodeError::NotAnArray(_))
        ));
    }

    #[test]
    fn garbage_is_a_json_error() {
        assert!(matches!(
            decode_chunk("[{\"x\":0.1,"),
            Err(FrameDecodeError::Json(_))
        ));
    }

    #[test]
    fn long_non_array_payload_is_truncated_in_error() {
        let payload = format!("\"{}\"", "z".repeat(500));
        let err = decode_chunk(&payload).unwrap_err();
        assert!(err.to_string().len() < 200);
    }
}
