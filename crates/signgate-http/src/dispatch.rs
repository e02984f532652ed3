//! The boundary between the HTTP layer and application logic.

use std::future::Future;
use std::pin::Pin;

use crate::body::SignGateResponseBody;
use crate::buffered::BufferedRequest;
use crate::error::GatewayError;

/// Boxed future returned by [`SignedHandler::handle`].
pub type HandlerFuture =
    Pin<Box<dyn Future<Output = Result<http::Response<SignGateResponseBody>, GatewayError>> + Send>>;

/// Trait implemented by the application behind the gateway.
///
/// The handler receives the buffered request after signature verification.
/// A verified request carries its [`signgate_auth::Authentication`] in the
/// request extensions, reachable through
/// [`BufferedRequest::authentication`].
pub trait SignedHandler: Send + Sync + 'static {
    /// Handle a request and produce a response.
    fn handle(&self, request: BufferedRequest) -> HandlerFuture;
}

/// Dispatch a buffered request to the handler.
pub async fn dispatch_request<H: SignedHandler>(
    handler: &H,
    request: BufferedRequest,
) -> Result<http::Response<SignGateResponseBody>, GatewayError> {
    tracing::debug!(
        method = %request.parts().method,
        path = request.parts().uri.path(),
        authenticated = request.authentication().is_some(),
        "dispatching request"
    );
    handler.handle(request).await
}
