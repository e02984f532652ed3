//! Body-buffering request wrapper.
//!
//! An incoming body stream can be consumed once, but the verifier has to hash
//! the whole body and the application still wants to read it afterwards.
//! [`BufferedRequest`] reads the stream into an owned [`Bytes`] buffer once;
//! every later read is served from that buffer. Form-encoded parameters are
//! decoded from the same buffer at construction so they survive as well.

use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use signgate_auth::Authentication;

use crate::error::GatewayError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A request whose body has been read into memory.
#[derive(Debug)]
pub struct BufferedRequest {
    parts: http::request::Parts,
    body: Bytes,
    form_params: Vec<(String, String)>,
}

impl BufferedRequest {
    /// Read `request`'s body fully, refusing bodies over `limit` bytes.
    ///
    /// # Errors
    ///
    /// Returns a `PayloadTooLarge` error if the body exceeds `limit` and a
    /// `BadRequest` error if the stream fails.
    pub async fn collect<B>(request: http::Request<B>, limit: usize) -> Result<Self, GatewayError>
    where
        B: http_body::Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = request.into_parts();
        let collected = Limited::new(body, limit).collect().await.map_err(|err| {
            if err.downcast_ref::<LengthLimitError>().is_some() {
                GatewayError::payload_too_large(limit)
            } else {
                GatewayError::bad_request(format!("Failed to read request body: {err}"))
            }
        })?;
        Ok(Self::from_parts(parts, collected.to_bytes()))
    }

    /// Wrap parts and an already buffered body.
    #[must_use]
    pub fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        let form_params = if is_form_encoded(&parts) {
            form_urlencoded::parse(&body).into_owned().collect()
        } else {
            Vec::new()
        };
        Self {
            parts,
            body,
            form_params,
        }
    }

    /// Request head.
    #[must_use]
    pub fn parts(&self) -> &http::request::Parts {
        &self.parts
    }

    /// Mutable request head, e.g. to attach extensions.
    pub fn parts_mut(&mut self) -> &mut http::request::Parts {
        &mut self.parts
    }

    /// The buffered body. Cloning [`Bytes`] is a reference-count bump.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Decoded `application/x-www-form-urlencoded` parameters, in body order.
    #[must_use]
    pub fn form_params(&self) -> &[(String, String)] {
        &self.form_params
    }

    /// First value of the form parameter `name`.
    #[must_use]
    pub fn form_param(&self, name: &str) -> Option<&str> {
        self.form_params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The authentication attached by the service, if the request verified.
    #[must_use]
    pub fn authentication(&self) -> Option<&Authentication> {
        self.parts.extensions.get::<Authentication>()
    }

    /// Reassemble an `http::Request` that owns the buffered body.
    #[must_use]
    pub fn into_request(self) -> http::Request<Bytes> {
        http::Request::from_parts(self.parts, self.body)
    }
}

fn is_form_encoded(parts: &http::request::Parts) -> bool {
    parts
        .headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}
