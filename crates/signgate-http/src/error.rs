//! HTTP-level errors returned by the SignGate service.

use std::fmt;

/// Well-known error codes, each mapped to one HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorCode {
    /// The request is malformed or its body could not be read.
    BadRequest,
    /// Authentication is required and was not provided or did not verify.
    Unauthorized,
    /// No route matches the request.
    NotFound,
    /// The request body exceeds the configured limit.
    PayloadTooLarge,
    /// Unexpected server-side failure.
    InternalError,
}

impl GatewayErrorCode {
    /// The code as it appears in JSON error bodies.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "BadRequest",
            Self::Unauthorized => "Unauthorized",
            Self::NotFound => "NotFound",
            Self::PayloadTooLarge => "PayloadTooLarge",
            Self::InternalError => "InternalError",
        }
    }

    /// HTTP status for this code.
    #[must_use]
    pub fn status_code(self) -> http::StatusCode {
        match self {
            Self::BadRequest => http::StatusCode::BAD_REQUEST,
            Self::Unauthorized => http::StatusCode::UNAUTHORIZED,
            Self::NotFound => http::StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => http::StatusCode::PAYLOAD_TOO_LARGE,
            Self::InternalError => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error answered directly by the gateway.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{code}: {message}")]
pub struct GatewayError {
    /// Error code.
    pub code: GatewayErrorCode,
    /// Human-readable message.
    pub message: String,
}

impl GatewayError {
    /// Create an error with a custom message.
    #[must_use]
    pub fn with_message(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Generic 401. The message carries no verification detail.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::with_message(GatewayErrorCode::Unauthorized, "Full authentication is required")
    }

    /// 413 for a body over `limit` bytes.
    #[must_use]
    pub fn payload_too_large(limit: usize) -> Self {
        Self::with_message(
            GatewayErrorCode::PayloadTooLarge,
            format!("Request body exceeds {limit} bytes"),
        )
    }

    /// 400 with a message.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_message(GatewayErrorCode::BadRequest, message)
    }

    /// 404 for an unknown route.
    #[must_use]
    pub fn not_found(path: &str) -> Self {
        Self::with_message(GatewayErrorCode::NotFound, format!("No route for {path}"))
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        self.code.status_code()
    }
}
