//! The SignGate HTTP service implementing hyper's `Service` trait.
//!
//! [`SignGateHttpService`] runs every request through the same pipeline:
//!
//! 1. Health check interception (`GET /health`)
//! 2. Body buffering with a size limit
//! 3. `SignedRequest` verification
//! 4. Dispatch to the [`SignedHandler`]
//! 5. Common response headers (`x-request-id`, `server`)

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use hyper::service::Service;
use signgate_auth::SignatureVerifier;
use signgate_core::DEFAULT_MAX_BODY_SIZE;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::body::SignGateResponseBody;
use crate::buffered::BufferedRequest;
use crate::dispatch::{SignedHandler, dispatch_request};
use crate::error::GatewayError;
use crate::response::{error_to_response, json_response};

/// Configuration for the SignGate HTTP service.
#[derive(Debug, Clone)]
pub struct SignGateHttpConfig {
    /// Reject requests without a valid signature instead of forwarding them
    /// unauthenticated.
    pub require_authentication: bool,
    /// Maximum buffered body size in bytes.
    pub max_body_size: usize,
    /// Verifier used for `SignedRequest` authentication. `None` disables it.
    pub verifier: Option<SignatureVerifier>,
}

impl Default for SignGateHttpConfig {
    fn default() -> Self {
        Self {
            require_authentication: false,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            verifier: None,
        }
    }
}

/// Hyper `Service` that authenticates requests before handing them to `H`.
#[derive(Debug)]
pub struct SignGateHttpService<H: SignedHandler> {
    handler: Arc<H>,
    config: Arc<SignGateHttpConfig>,
}

impl<H: SignedHandler> SignGateHttpService<H> {
    /// Create a new service with the given handler and configuration.
    #[must_use]
    pub fn new(handler: H, config: SignGateHttpConfig) -> Self {
        Self {
            handler: Arc::new(handler),
            config: Arc::new(config),
        }
    }
}

impl<H: SignedHandler> Clone for SignGateHttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            config: Arc::clone(&self.config),
        }
    }
}

impl<H, B> Service<http::Request<B>> for SignGateHttpService<H>
where
    H: SignedHandler,
    B: http_body::Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Response = http::Response<SignGateResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let handler = Arc::clone(&self.handler);
        let config = Arc::clone(&self.config);
        let request_id = Uuid::new_v4().to_string();

        Box::pin(async move {
            let response = match process_request(req, handler.as_ref(), &config, &request_id).await
            {
                Ok(response) => response,
                Err(err) => {
                    debug!(error = %err, request_id, "request answered with error");
                    error_to_response(&err)
                }
            };
            Ok(add_common_headers(response, &request_id))
        })
    }
}

/// Process a single request through the pipeline.
async fn process_request<H, B>(
    req: http::Request<B>,
    handler: &H,
    config: &SignGateHttpConfig,
    request_id: &str,
) -> Result<http::Response<SignGateResponseBody>, GatewayError>
where
    H: SignedHandler,
    B: http_body::Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    debug!(method = %req.method(), uri = %req.uri(), request_id, "processing request");

    // 1. Health check interception.
    if is_health_check(req.method(), req.uri().path()) {
        return Ok(health_check_response());
    }

    // 2. Buffer the body so both the verifier and the handler can read it.
    let mut request = BufferedRequest::collect(req, config.max_body_size)
        .await
        .inspect_err(|err| warn!(error = %err, request_id, "failed to buffer request body"))?;

    // 3. Authenticate.
    authenticate(&mut request, config, request_id)?;

    // 4. Dispatch.
    dispatch_request(handler, request).await
}

/// Verify the buffered request and attach the authentication on success.
fn authenticate(
    request: &mut BufferedRequest,
    config: &SignGateHttpConfig,
    request_id: &str,
) -> Result<(), GatewayError> {
    let Some(verifier) = config.verifier.as_ref() else {
        if config.require_authentication {
            warn!(request_id, "authentication required but no verifier is configured");
            return Err(GatewayError::unauthorized());
        }
        return Ok(());
    };

    match verifier.verify(request.parts(), request.body()) {
        Ok(Some(authentication)) => {
            request.parts_mut().extensions.insert(authentication);
            Ok(())
        }
        Ok(None) if config.require_authentication => {
            debug!(request_id, "rejecting unauthenticated request");
            Err(GatewayError::unauthorized())
        }
        Ok(None) => Ok(()),
        Err(err) => {
            error!(error = %err, request_id, "authentication service failure");
            Err(GatewayError::unauthorized())
        }
    }
}

/// Check if the request is a health check probe.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET && path == "/health"
}

/// Produce a health check response.
fn health_check_response() -> http::Response<SignGateResponseBody> {
    json_response(br#"{"status":"running"}"#.to_vec())
}

/// Add common response headers to every response.
fn add_common_headers(
    mut response: http::Response<SignGateResponseBody>,
    request_id: &str,
) -> http::Response<SignGateResponseBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.insert("x-request-id", hv);
    }
    headers.insert("server", http::HeaderValue::from_static("SignGate"));

    response
}
