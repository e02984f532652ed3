//! Application endpoints served behind the gateway.

use signgate_http::response::json_response;
use signgate_http::{
    BufferedRequest, GatewayError, GatewayErrorCode, HandlerFuture, SignGateResponseBody,
    SignedHandler,
};

/// Routes:
///
/// - `GET /whoami`: the caller's authentication as JSON
/// - `POST /echo`: the buffered body, unchanged
#[derive(Debug, Clone, Default)]
pub struct GatewayHandler;

impl SignedHandler for GatewayHandler {
    fn handle(&self, request: BufferedRequest) -> HandlerFuture {
        let method = request.parts().method.clone();
        let path = request.parts().uri.path().to_owned();

        let result = match (method, path.as_str()) {
            (http::Method::GET, "/whoami") => whoami(&request),
            (http::Method::POST, "/echo") => echo(&request),
            _ => Err(GatewayError::not_found(&path)),
        };

        Box::pin(async move { result })
    }
}

fn whoami(request: &BufferedRequest) -> Result<http::Response<SignGateResponseBody>, GatewayError> {
    let body = match request.authentication() {
        Some(auth) => serde_json::json!({
            "authenticated": true,
            "clientId": auth.client_id(),
            "authorities": auth.authorities.iter().map(ToString::to_string).collect::<Vec<_>>(),
        }),
        None => serde_json::json!({
            "authenticated": false,
            "clientId": null,
            "authorities": [],
        }),
    };
    serde_json::to_vec(&body)
        .map(json_response)
        .map_err(|e| GatewayError::with_message(GatewayErrorCode::InternalError, e.to_string()))
}

fn echo(request: &BufferedRequest) -> Result<http::Response<SignGateResponseBody>, GatewayError> {
    let content_type = request
        .parts()
        .headers
        .get(http::header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| http::HeaderValue::from_static("application/octet-stream"));

    http::Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, content_type)
        .header("x-form-params", request.form_params().len())
        .body(SignGateResponseBody::from_bytes(request.body().clone()))
        .map_err(|e| GatewayError::with_message(GatewayErrorCode::InternalError, e.to_string()))
}
