//! Pull framing: newline-delimited JSON chunks, terminated by EOF.
//!
//! A segment is a complete frame exactly when a `\n` follows it. The segment
//! after the last `\n` stays buffered until more bytes arrive, or until
//! [`LineDecoder::finish`] is called, because EOF terminates it too.

use pi_types::FrameDecodeError;

use crate::decoder::LineBuffer;
use crate::frame::Frame;

/// Incremental decoder for `application/stream+json` bodies.
#[derive(Debug, Default)]
pub struct LineDecoder {
    lines: LineBuffer,
}

impl LineDecoder {
    /// A decoder with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes and drain every line they complete. Blank lines are skipped.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Result<Frame, FrameDecodeError>> {
        self.lines.push(bytes);
        let mut out = Vec::new();
        while let Some(line) = self.lines.next_line() {
            if let Some(frame) = to_frame(&line) {
                out.push(frame);
            }
        }
        out
    }

    /// End of input: flush the trailing segment and emit [`Frame::Done`].
    pub fn finish(&mut self) -> Vec<Result<Frame, FrameDecodeError>> {
        let rest = self.lines.take_rest();
        let mut out = Vec::with_capacity(2);
        if let Some(frame) = to_frame(&rest) {
            out.push(frame);
        }
        out.push(Ok(Frame::Done));
        out
    }

    /// Bytes currently withheld as a possibly partial line.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lines.len()
    }
}

fn to_frame(line: &[u8]) -> Option<Result<Frame, FrameDecodeError>> {
    match std::str::from_utf8(line) {
        Ok(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| Ok(Frame::Chunk(text.to_string())))
        }
        Err(e) => Some(Err(e.into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_complete_line_in_one_read_is_not_withheld() {
        let mut d = LineDecoder::new();
        let out = d.feed(b"[{\"x\":0.1,\"y\":0.2}]\n");
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].as_ref().unwrap(),
            &Frame::Chunk(r#"[{"x":0.1,"y":0.2}]"#.into())
        );
        assert_eq!(d.pending(), 0);
    }

    #[test]
    fn last_segment_is_retained_until_terminated() {
        let mut d = LineDecoder::new();
        let out = d.feed(b"[]\n[{\"x\":");
        assert_eq!(out.len(), 1);
        assert_eq!(d.pending(), 6);
        let out = d.feed(b"0.5,\"y\":0.5}]\n");
        assert_eq!(
            out[0].as_ref().unwrap(),
            &Frame::Chunk(r#"[{"x":0.5,"y":0.5}]"#.into())
        );
    }

    #[test]
    fn eof_flushes_unterminated_tail_then_done() {
        let mut d = LineDecoder::new();
        assert!(d.feed(b"[]").is_empty());
        let out: Vec<_> = d.finish().into_iter().map(Result::unwrap).collect();
        assert_eq!(out, vec![Frame::Chunk("[]".into()), Frame::Done]);
    }

    #[test]
    fn empty_body_is_just_done() {
        let mut d = LineDecoder::new();
        let out: Vec<_> = d.finish().into_iter().map(Result::unwrap).collect();
        assert_eq!(out, vec![Frame::Done]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let mut d = LineDecoder::new();
        let out = d.feed(b"\n\r\n[]\n\n");
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn invalid_utf8_line_is_an_error_and_decoding_continues() {
        let mut d = LineDecoder::new();
        let out = d.feed(b"\xff\n[]\n");
        assert!(matches!(out[0], Err(FrameDecodeError::Utf8(_))));
        assert_eq!(out[1].as_ref().unwrap(), &Frame::Chunk("[]".into()));
    }
}
