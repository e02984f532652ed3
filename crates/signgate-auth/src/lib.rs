//! `SignedRequest` HMAC-SHA1 request authentication for SignGate.
//!
//! A client holding a shared secret signs each request over its method, the
//! Base64 MD5 of its body and its `Date` header. The server looks the client
//! up by key id, recomputes the signature and checks the date is within a
//! fifteen minute freshness window.
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use signgate_auth::{AuthorizedClient, RequestSigner, SignatureVerifier, StaticClientRegistry};
//! use uuid::Uuid;
//!
//! let id = Uuid::from_u128(0x1111_1111_1111_1111_1111_1111_1111_1111);
//! let registry =
//!     StaticClientRegistry::new(vec![AuthorizedClient::new(id, "topsecret", ["ADMIN"])]).unwrap();
//!
//! // Client side: sign an outgoing request.
//! let signer = RequestSigner::new(id, "topsecret").unwrap();
//! let request = signer
//!     .sign(http::Request::post("http://localhost/orders").body(b"{}".to_vec()).unwrap())
//!     .unwrap();
//!
//! // Server side: verify it.
//! let verifier = SignatureVerifier::new(Arc::new(registry));
//! let (parts, body) = request.into_parts();
//! let auth = verifier.verify(&parts, &body).unwrap().unwrap();
//! assert!(auth.has_role("ADMIN"));
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - String-to-sign, body hash, date and header formats
//! - [`error`] - Authentication error types
//! - [`registry`] - Client registry trait and implementations
//! - [`signer`] - Outbound request signing
//! - [`verifier`] - Inbound signature verification and freshness check

pub mod canonical;
pub mod error;
pub mod registry;
pub mod signer;
pub mod verifier;

pub use canonical::{hash_body, is_signed_request};
pub use error::AuthError;
pub use registry::{AuthorizedClient, ClientRegistry, FnClientRegistry, StaticClientRegistry};
pub use signer::{RequestSigner, SignatureHeaders, sign_request};
pub use verifier::{
    Authentication, FRESHNESS_WINDOW_SECS, GrantedAuthority, SignatureVerifier, check_freshness,
    verify_signature,
};
