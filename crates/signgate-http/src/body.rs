//! Response body type for SignGate.
//!
//! Every response the gateway produces is fully buffered: JSON payloads,
//! error bodies and echoed request bodies alike.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::{Body, Frame, SizeHint};
use http_body_util::Full;

/// Buffered response body.
#[derive(Debug)]
pub struct SignGateResponseBody(Full<Bytes>);

impl SignGateResponseBody {
    /// Create a body from bytes.
    #[must_use]
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self(Full::new(data.into()))
    }

    /// Create a body from JSON-serialized bytes.
    #[must_use]
    pub fn from_json(json: Vec<u8>) -> Self {
        Self::from_bytes(json)
    }
}

impl Body for SignGateResponseBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, Infallible>>> {
        Pin::new(&mut self.0).poll_frame(cx)
    }

    fn is_end_stream(&self) -> bool {
        self.0.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.0.size_hint()
    }
}
