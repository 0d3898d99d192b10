//! The seam between the consumer and whatever serves points.

use std::future::Future;

use crate::error::TransportError;
use crate::streaming::FrameStream;

/// Opens a point stream for `n` points.
///
/// [`EstimateClient`](crate::EstimateClient) is the HTTP implementation; tests
/// substitute scripted sources.
pub trait FrameSource: Send + Sync {
    /// Open a stream of `n` points. Resolves once the stream is established.
    fn open(&self, n: u64) -> impl Future<Output = Result<FrameStream, TransportError>> + Send;
}

impl<T: FrameSource> FrameSource for std::sync::Arc<T> {
    fn open(&self, n: u64) -> impl Future<Output = Result<FrameStream, TransportError>> + Send {
        (**self).open(n)
    }
}
