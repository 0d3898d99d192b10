//! Framing selection and frame encoding.

use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, Bytes, BytesMut};
use pi_types::Point;
use serde::{Deserialize, Serialize};

use crate::frame::DONE_SENTINEL;

/// Which wire convention a stream uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framing {
    /// Server-sent events terminated by a `[DONE]` frame.
    #[default]
    #[serde(alias = "push")]
    Sse,
    /// Newline-delimited JSON arrays terminated by EOF.
    #[serde(alias = "pull")]
    Ndjson,
}

impl Framing {
    /// The `Content-Type` a producer sends for this framing.
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Sse => "text/event-stream",
            Self::Ndjson => "application/stream+json",
        }
    }

    /// Points per chunk when the server is not configured otherwise.
    #[must_use]
    pub fn default_chunk_size(self) -> usize {
        match self {
            Self::Sse => 1000,
            Self::Ndjson => 10,
        }
    }

    /// Query-string value selecting this framing.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sse => "sse",
            Self::Ndjson => "ndjson",
        }
    }

    /// Whether the stream carries an explicit end-of-stream frame.
    #[must_use]
    pub fn has_sentinel(self) -> bool {
        matches!(self, Self::Sse)
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unrecognised framing name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown framing '{0}', expected 'sse' or 'ndjson'")]
pub struct UnknownFraming(pub String);

impl FromStr for Framing {
    type Err = UnknownFraming;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sse" | "push" | "event-stream" => Ok(Self::Sse),
            "ndjson" | "pull" | "stream+json" => Ok(Self::Ndjson),
            _ => Err(UnknownFraming(s.to_string())),
        }
    }
}

/// Encode one chunk as a complete frame.
///
/// The JSON is fully serialized before any bytes are returned, so a failure
/// never leaves a half-written frame.
pub fn encode_chunk(framing: Framing, chunk: &[Point]) -> Result<Bytes, serde_json::Error> {
    let json = serde_json::to_vec(chunk)?;
    let mut buf = BytesMut::with_capacity(json.len() + 8);
    match framing {
        Framing::Sse => {
            buf.put_slice(b"data: ");
            buf.put_slice(&json);
            buf.put_slice(b"\n\n");
        }
        Framing::Ndjson => {
            buf.put_slice(&json);
            buf.put_u8(b'\n');
        }
    }
    Ok(buf.freeze())
}

/// The end-of-stream frame, if this framing has one.
#[must_use]
pub fn encode_done(framing: Framing) -> Option<Bytes> {
    match framing {
        Framing::Sse => Some(Bytes::from(format!("data: {DONE_SENTINEL}\n\n"))),
        Framing::Ndjson => None,
    }
}
