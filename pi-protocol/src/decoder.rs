//! Incremental decoding shared by both framings.

use pi_types::FrameDecodeError;

use crate::frame::Frame;
use crate::framing::Framing;
use crate::ndjson::LineDecoder;
use crate::sse::SseDecoder;

/// A decoder for whichever framing the stream was opened with.
///
/// Feed it bytes exactly as they come off the socket; it returns every frame
/// completed by those bytes, in order. Frame-level errors are returned inline
/// and never poison later frames.
#[derive(Debug)]
pub enum Decoder {
    /// Push variant.
    Sse(SseDecoder),
    /// Pull variant.
    Ndjson(LineDecoder),
}

impl Decoder {
    /// A fresh decoder for `framing`.
    #[must_use]
    pub fn for_framing(framing: Framing) -> Self {
        match framing {
            Framing::Sse => Self::Sse(SseDecoder::new()),
            Framing::Ndjson => Self::Ndjson(LineDecoder::new()),
        }
    }

    /// The framing this decoder understands.
    #[must_use]
    pub fn framing(&self) -> Framing {
        match self {
            Self::Sse(_) => Framing::Sse,
            Self::Ndjson(_) => Framing::Ndjson,
        }
    }

    /// Append bytes and drain every frame they complete.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Result<Frame, FrameDecodeError>> {
        match self {
            Self::Sse(d) => d.feed(bytes),
            Self::Ndjson(d) => d.feed(bytes),
        }
    }

    /// Signal end of input and drain whatever that completes.
    pub fn finish(&mut self) -> Vec<Result<Frame, FrameDecodeError>> {
        match self {
            Self::Sse(d) => d.finish(),
            Self::Ndjson(d) => d.finish(),
        }
    }
}

/// Raw byte buffer that hands out `\n`-terminated lines.
///
/// A segment becomes a line only once its terminator has arrived; anything
/// after the last `\n` stays buffered for the next read.
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    buf: Vec<u8>,
    // Bytes before this offset are known to contain no '\n'.
    scanned: usize,
}

impl LineBuffer {
    pub(crate) fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Next complete line with its `\n` (and any `\r`) stripped.
    pub(crate) fn next_line(&mut self) -> Option<Vec<u8>> {
        let offset = self.buf[self.scanned..].iter().position(|&b| b == b'\n');
        let Some(offset) = offset else {
            self.scanned = self.buf.len();
            return None;
        };
        let end = self.scanned + offset;
        let mut line: Vec<u8> = self.buf.drain(..=end).collect();
        self.scanned = 0;
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(line)
    }

    /// Take the unterminated remainder, leaving the buffer empty.
    pub(crate) fn take_rest(&mut self) -> Vec<u8> {
        self.scanned = 0;
        std::mem::take(&mut self.buf)
    }

    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }
}
