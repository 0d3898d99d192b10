#![deny(missing_docs)]
//! Wire framing for chunked point streams.
//!
//! Two interchangeable conventions share one long-lived HTTP response body:
//!
//! | Variant | Content type | Frame | End of stream |
//! |---------|--------------|-------|---------------|
//! | Push ([`Framing::Sse`]) | `text/event-stream` | `data: <json>\n\n` | `data: [DONE]\n\n` |
//! | Pull ([`Framing::Ndjson`]) | `application/stream+json` | `<json>\n` | body EOF |
//!
//! Push is the canonical variant. Decoders ([`SseDecoder`], [`LineDecoder`])
//! buffer raw bytes, so frames split at any byte offset across network reads
//! (including inside a UTF-8 sequence) decode identically to unsplit input.

pub mod decoder;
pub mod frame;
pub mod framing;
pub mod ndjson;
pub mod sse;

pub use decoder::Decoder;
pub use frame::{DONE_SENTINEL, Frame, decode_chunk};
pub use framing::{Framing, UnknownFraming, encode_chunk, encode_done};
pub use ndjson::LineDecoder;
pub use sse::SseDecoder;
