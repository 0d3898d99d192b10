//! Push framing: a minimal server-sent events decoder.
//!
//! Only the `data` field matters here. Events are dispatched on a blank line;
//! multiple `data:` lines in one event are joined with `\n`. Comment lines
//! (leading `:`, e.g. keep-alives) and the `event`, `id` and `retry` fields
//! are ignored. An event still open when the input ends is discarded and
//! reported as [`FrameDecodeError::Truncated`].
//!
//! Reference: <https://html.spec.whatwg.org/multipage/server-sent-events.html#event-stream-interpretation>

use pi_types::FrameDecodeError;

use crate::decoder::LineBuffer;
use crate::frame::{DONE_SENTINEL, Frame};

/// Incremental decoder for `text/event-stream` bodies.
#[derive(Debug, Default)]
pub struct SseDecoder {
    lines: LineBuffer,
    data: Vec<String>,
    /// Set when a line of the current event was not UTF-8; the event is dropped.
    poisoned: bool,
}

impl SseDecoder {
    /// A decoder with empty buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes and drain every event they complete.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Result<Frame, FrameDecodeError>> {
        self.lines.push(bytes);
        let mut out = Vec::new();
        while let Some(line) = self.lines.next_line() {
            match std::str::from_utf8(&line) {
                Ok(line) => {
                    if let Some(frame) = self.process_line(line) {
                        out.push(Ok(frame));
                    }
                }
                Err(e) => {
                    self.poisoned = true;
                    out.push(Err(e.into()));
                }
            }
        }
        out
    }

    /// End of input. An unterminated event is reported, never dispatched.
    pub fn finish(&mut self) -> Vec<Result<Frame, FrameDecodeError>> {
        let rest = self.lines.take_rest();
        let pending: usize = rest.len() + self.data.iter().map(String::len).sum::<usize>();
        let had_event = !self.data.is_empty() || !rest.iter().all(u8::is_ascii_whitespace);
        self.data.clear();
        self.poisoned = false;
        if had_event {
            vec![Err(FrameDecodeError::Truncated(pending))]
        } else {
            Vec::new()
        }
    }

    fn process_line(&mut self, line: &str) -> Option<Frame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data.push(value.to_string());
        }
        None
    }

    fn dispatch(&mut self) -> Option<Frame> {
        if std::mem::take(&mut self.poisoned) {
            self.data.clear();
            return None;
        }
        if self.data.is_empty() {
            return None;
        }
        let payload = self.data.join("\n");
        self.data.clear();
        if payload == DONE_SENTINEL {
            Some(Frame::Done)
        } else {
            Some(Frame::Chunk(payload))
        }
    }
}
