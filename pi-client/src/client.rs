//! HTTP client for `GET /estimate`.

use std::time::Duration;

use pi_protocol::Framing;

use crate::error::{TransportError, map_http_status, map_reqwest_error};
use crate::source::FrameSource;
use crate::streaming::{FrameStream, stream_frames};

/// Default limit on how long establishing a stream may take.
const DEFAULT_OPEN_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for a pi producer.
///
/// Implements [`FrameSource`], so it plugs straight into
/// [`StreamConsumer`](crate::StreamConsumer).
///
/// # Example
///
/// ```no_run
/// use pi_client::EstimateClient;
/// use pi_protocol::Framing;
///
/// let client = EstimateClient::new("http://localhost:3000")
///     .framing(Framing::Ndjson);
/// ```
#[derive(Debug, Clone)]
pub struct EstimateClient {
    /// Server base URL.
    pub(crate) base_url: String,
    /// Framing requested via `?framing=`.
    pub(crate) framing: Framing,
    /// Limit on connect plus response headers. The body is not bounded.
    pub(crate) open_timeout: Duration,
    /// Shared HTTP client.
    pub(crate) client: reqwest::Client,
}

impl EstimateClient {
    /// A client for the server at `base_url`, using push framing.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            framing: Framing::default(),
            open_timeout: DEFAULT_OPEN_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    /// Choose the transport framing.
    #[must_use]
    pub fn framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// Bound how long opening a stream may take. The body itself is unbounded.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.open_timeout = timeout;
        self
    }

    /// Use a preconfigured [`reqwest::Client`] (proxies, TLS roots, pools).
    #[must_use]
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Build the estimate endpoint URL for `n` points.
    #[must_use]
    pub fn estimate_url(&self, n: u64) -> String {
        format!(
            "{}/estimate?n={n}&framing={}",
            self.base_url.trim_end_matches('/'),
            self.framing
        )
    }
}

impl FrameSource for EstimateClient {
    /// Send the request and hand back the body as a [`FrameStream`].
    ///
    /// Non-success responses are read in full and mapped to
    /// [`TransportError::Status`].
    fn open(&self, n: u64) -> impl Future<Output = Result<FrameStream, TransportError>> + Send {
        let url = self.estimate_url(n);
        let framing = self.framing;
        let open_timeout = self.open_timeout;
        let http_client = self.client.clone();

        async move {
            tracing::debug!(url = %url, %framing, "opening point stream");

            let response = tokio::time::timeout(open_timeout, http_client.get(&url).send())
                .await
                .map_err(|_| TransportError::Timeout(open_timeout))?
                .map_err(map_reqwest_error)?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(map_http_status(status, &body));
            }

            Ok(stream_frames(response, framing))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_url_carries_count_and_framing() {
        let client = EstimateClient::new("http://example.test/")
            .framing(Framing::Ndjson);
        assert_eq!(
            client.estimate_url(1000),
            "http://example.test/estimate?n=1000&framing=ndjson"
        );
    }

    #[test]
    fn defaults_to_push_framing() {
        let client = EstimateClient::new("http://localhost:3000");
        assert_eq!(
            client.estimate_url(4),
            "http://localhost:3000/estimate?n=4&framing=sse"
        );
    }
}
