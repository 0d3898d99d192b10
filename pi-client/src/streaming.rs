//! Turning a response body into a stream of decoded frames.
//!
//! The body is consumed as raw bytes and fed through the framing's
//! [`Decoder`], so frames split across reads are reassembled before they are
//! parsed. Every stream ends in exactly one of two ways: a
//! [`Frame::Done`] event, or a [`FrameEvent::Error`]. Nothing is read from
//! the body after `Done`.

use std::fmt::Display;
use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use pi_protocol::{Decoder, Frame, Framing};
use pi_types::FrameDecodeError;

use crate::error::TransportError;

/// One item from a [`FrameStream`].
#[derive(Debug)]
pub enum FrameEvent {
    /// A complete frame.
    Frame(Frame),
    /// A frame that could not be reassembled; later frames are unaffected.
    Malformed(FrameDecodeError),
    /// The transport failed. This is the last item.
    Error(TransportError),
}

/// An open point stream. Dropping it releases the connection.
pub struct FrameStream {
    /// The decoded frames. Consume with `StreamExt::next()`.
    pub receiver: Pin<Box<dyn Stream<Item = FrameEvent> + Send>>,
}

impl FrameStream {
    /// Wrap an already-decoded event stream.
    pub fn new(events: impl Stream<Item = FrameEvent> + Send + 'static) -> Self {
        Self {
            receiver: Box::pin(events),
        }
    }

    /// Decode a raw body byte stream with `framing`.
    pub fn from_bytes<E>(
        framing: Framing,
        bytes: impl Stream<Item = Result<Bytes, E>> + Send + 'static,
    ) -> Self
    where
        E: Display + Send + 'static,
    {
        Self::new(parse_frame_stream(framing, bytes))
    }
}

impl std::fmt::Debug for FrameStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameStream").finish_non_exhaustive()
    }
}

/// Wrap an HTTP response body into a [`FrameStream`].
pub(crate) fn stream_frames(response: reqwest::Response, framing: Framing) -> FrameStream {
    FrameStream::from_bytes(framing, response.bytes_stream())
}

fn parse_frame_stream<E>(
    framing: Framing,
    byte_stream: impl Stream<Item = Result<Bytes, E>> + Send + 'static,
) -> impl Stream<Item = FrameEvent> + Send + 'static
where
    E: Display + Send + 'static,
{
    async_stream::stream! {
        let mut decoder = Decoder::for_framing(framing);
        let mut bytes_stream = std::pin::pin!(byte_stream);

        while let Some(chunk_result) = bytes_stream.next().await {
            let chunk = match chunk_result.map_err(|e| e.to_string()) {
                Ok(b) => b,
                Err(message) => {
                    yield FrameEvent::Error(TransportError::Read(message));
                    return;
                }
            };

            for item in decoder.feed(&chunk) {
                match item {
                    Ok(Frame::Done) => {
                        yield FrameEvent::Frame(Frame::Done);
                        return;
                    }
                    Ok(frame) => yield FrameEvent::Frame(frame),
                    Err(e) => yield FrameEvent::Malformed(e),
                }
            }
        }

        // EOF: the pull variant completes here; the push variant should
        // already have returned on its sentinel.
        let mut done = false;
        for item in decoder.finish() {
            match item {
                Ok(Frame::Done) => {
                    done = true;
                    yield FrameEvent::Frame(Frame::Done);
                }
                Ok(frame) => yield FrameEvent::Frame(frame),
                Err(e) => yield FrameEvent::Malformed(e),
            }
        }
        if !done {
            yield FrameEvent::Error(TransportError::Incomplete);
        }
    }
}
