//! Error types for signed-request authentication.
//!
//! All failures are represented by [`AuthError`]. The verifier splits the
//! variants into two groups: outcomes that only mean "this request is not
//! authenticated" ([`AuthError::is_unauthenticated`]) and hard failures that
//! point at a misconfigured client or a broken registry backend.

use uuid::Uuid;

/// Errors that can occur while signing or verifying a `SignedRequest`.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The signer or the client registry is misconfigured (blank secret,
    /// duplicate client, unknown signing client).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request carries a `SignedRequest` header but some part of it
    /// cannot be interpreted.
    #[error("Malformed signed request: {0}")]
    MalformedRequest(String),

    /// The `Date` header lies outside the freshness window.
    #[error("Request date is outside the freshness window")]
    RequestExpired,

    /// The computed signature does not match the provided signature.
    #[error("Signature does not match")]
    SignatureMismatch,

    /// The claimed key id is not present in the client registry.
    #[error("Client not registered: {0}")]
    ClientNotRegistered(Uuid),

    /// The client registry backend failed to answer a lookup.
    #[error("Client lookup failed: {0}")]
    Lookup(String),

    /// Computing a digest or HMAC failed.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Reading a client registry file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuthError {
    /// Whether this error only means the request is not authenticated.
    ///
    /// Such outcomes are logged and swallowed by the verifier so that a
    /// pipeline can fall through to another authentication mechanism.
    #[must_use]
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::MalformedRequest(_) | Self::RequestExpired | Self::SignatureMismatch
        )
    }
}
