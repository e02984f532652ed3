//! JSON response helpers.

use crate::body::SignGateResponseBody;
use crate::error::{GatewayError, GatewayErrorCode};

/// Content type for JSON responses.
pub const CONTENT_TYPE: &str = "application/json";

/// Serialize a gateway error into a JSON body.
///
/// ```json
/// { "error": "Unauthorized", "message": "Full authentication is required" }
/// ```
#[must_use]
pub fn error_to_json(error: &GatewayError) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "error": error.code.as_str(),
        "message": error.message,
    }))
    .expect("JSON serialization of error cannot fail")
}

/// Convert a [`GatewayError`] into a complete HTTP error response.
#[must_use]
pub fn error_to_response(error: &GatewayError) -> http::Response<SignGateResponseBody> {
    let mut builder = http::Response::builder()
        .status(error.status_code())
        .header("content-type", CONTENT_TYPE);

    if error.code == GatewayErrorCode::Unauthorized {
        builder = builder.header("www-authenticate", "SignedRequest");
    }

    builder
        .body(SignGateResponseBody::from_json(error_to_json(error)))
        .expect("valid error response")
}

/// Build a `200 OK` response from JSON bytes.
#[must_use]
pub fn json_response(json: Vec<u8>) -> http::Response<SignGateResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("content-type", CONTENT_TYPE)
        .body(SignGateResponseBody::from_json(json))
        .expect("valid JSON response")
}
