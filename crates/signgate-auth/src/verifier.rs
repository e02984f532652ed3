//! Inbound `SignedRequest` verification.
//!
//! The flow for a request carrying `Authorization: SignedRequest ...`:
//!
//! 1. Check the `Date` header lies within [`FRESHNESS_WINDOW_SECS`] of now.
//! 2. Split the header into key id and signature.
//! 3. Resolve the client through the [`ClientRegistry`].
//! 4. Rebuild the string to sign from method, body hash and `Date`.
//! 5. Compare the expected and provided signatures in constant time.
//!
//! [`verify_signature`] returns `Ok(None)` for anything that only means "not
//! authenticated" (not signed, stale, malformed, mismatched) and `Err` for
//! hard failures (unregistered client, broken registry).

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use subtle::ConstantTimeEq;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::canonical::{
    build_string_to_sign, compute_signature, hash_body, is_signed_request,
    parse_authorization_header, parse_date,
};
use crate::error::AuthError;
use crate::registry::{AuthorizedClient, ClientRegistry};

/// Maximum distance, in seconds, between the `Date` header and the
/// verifier's clock, in either direction.
pub const FRESHNESS_WINDOW_SECS: i64 = 15 * 60;

/// Prefix prepended to each role to form a granted authority.
pub const ROLE_PREFIX: &str = "ROLE_";

/// An authority granted to an authenticated client, e.g. `ROLE_ADMIN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GrantedAuthority(String);

impl GrantedAuthority {
    /// Build the authority for a configured role name.
    #[must_use]
    pub fn from_role(role: &str) -> Self {
        Self(format!("{ROLE_PREFIX}{role}"))
    }

    /// The authority name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GrantedAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The result of a successful verification.
///
/// Only the principal's id and authorities are kept; the shared secret never
/// leaves the registry lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authentication {
    /// Key id of the client that signed the request.
    pub client_id: Uuid,
    /// One `ROLE_*` authority per configured role.
    pub authorities: Vec<GrantedAuthority>,
}

impl Authentication {
    /// Bind `client` as principal and derive its authorities.
    #[must_use]
    pub fn for_client(client: &AuthorizedClient) -> Self {
        Self {
            client_id: client.id,
            authorities: client
                .roles
                .iter()
                .map(|role| GrantedAuthority::from_role(role))
                .collect(),
        }
    }

    /// The authenticated client's key id.
    #[must_use]
    pub fn client_id(&self) -> Uuid {
        self.client_id
    }

    /// Whether the client holds `ROLE_{role}`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.authorities
            .iter()
            .any(|a| a.as_str().strip_prefix(ROLE_PREFIX) == Some(role))
    }
}

/// Verify a possibly signed request against the current wall clock.
///
/// `body` must be the complete request body; callers reading from a
/// single-use stream buffer it first.
///
/// # Errors
///
/// Returns [`AuthError::ClientNotRegistered`] if the claimed key id is
/// unknown and [`AuthError::Lookup`] (or any other registry error) if the
/// registry fails. Every other failure yields `Ok(None)`.
pub fn verify_signature(
    parts: &http::request::Parts,
    body: &[u8],
    registry: &dyn ClientRegistry,
) -> Result<Option<Authentication>, AuthError> {
    verify_signature_at(parts, body, registry, Utc::now())
}

/// Verification against an explicit clock reading.
pub(crate) fn verify_signature_at(
    parts: &http::request::Parts,
    body: &[u8],
    registry: &dyn ClientRegistry,
    now: DateTime<Utc>,
) -> Result<Option<Authentication>, AuthError> {
    let Some(auth_header) = parts
        .headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| is_signed_request(v))
    else {
        debug!("request is not SignedRequest-authenticated");
        return Ok(None);
    };

    match authenticate(parts, auth_header, body, registry, now) {
        Ok(authentication) => {
            info!(
                client_id = %authentication.client_id(),
                authorities = ?authentication.authorities,
                "SignedRequest verification succeeded"
            );
            Ok(Some(authentication))
        }
        Err(err) if err.is_unauthenticated() => {
            warn!(error = %err, method = %parts.method, uri = %parts.uri, "SignedRequest rejected");
            Ok(None)
        }
        Err(err) => {
            error!(error = %err, method = %parts.method, uri = %parts.uri, "SignedRequest verification failed");
            Err(err)
        }
    }
}

fn authenticate(
    parts: &http::request::Parts,
    auth_header: &str,
    body: &[u8],
    registry: &dyn ClientRegistry,
    now: DateTime<Utc>,
) -> Result<Authentication, AuthError> {
    let date = parts
        .headers
        .get(http::header::DATE)
        .ok_or_else(|| AuthError::MalformedRequest("missing Date header".to_owned()))?
        .to_str()
        .map_err(|_| AuthError::MalformedRequest("non-ASCII Date header".to_owned()))?;

    check_freshness(parse_date(date)?, now)?;

    let (key_id, provided_signature) = parse_authorization_header(auth_header)?;
    let key_id = Uuid::parse_str(key_id)
        .map_err(|_| AuthError::MalformedRequest(format!("key id is not a UUID: {key_id}")))?;

    let client = registry
        .find_by_id(&key_id)?
        .ok_or(AuthError::ClientNotRegistered(key_id))?;

    let string_to_sign = build_string_to_sign(parts.method.as_str(), &hash_body(body), date);
    debug!(client_id = %key_id, string_to_sign, "rebuilt SignedRequest string to sign");

    let expected_signature = compute_signature(&client.secret_key, &string_to_sign)?;

    if provided_signature
        .as_bytes()
        .ct_eq(expected_signature.as_bytes())
        .into()
    {
        Ok(Authentication::for_client(&client))
    } else {
        Err(AuthError::SignatureMismatch)
    }
}

/// Check that `date` lies within the freshness window around `now`.
///
/// A skew of exactly [`FRESHNESS_WINDOW_SECS`] is still accepted.
///
/// # Errors
///
/// Returns [`AuthError::RequestExpired`] if the skew is larger.
pub fn check_freshness(date: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), AuthError> {
    let skew = (now.timestamp() - date.timestamp()).abs();
    if skew > FRESHNESS_WINDOW_SECS {
        debug!(skew_secs = skew, "Date header outside freshness window");
        return Err(AuthError::RequestExpired);
    }
    Ok(())
}

/// A verifier bound to one client registry.
///
/// Cheap to clone; share one per service.
#[derive(Clone)]
pub struct SignatureVerifier {
    registry: Arc<dyn ClientRegistry>,
}

impl fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("registry", &"...")
            .finish()
    }
}

impl SignatureVerifier {
    /// Create a verifier resolving clients through `registry`.
    #[must_use]
    pub fn new(registry: Arc<dyn ClientRegistry>) -> Self {
        Self { registry }
    }

    /// Verify request parts and their buffered body.
    ///
    /// # Errors
    ///
    /// See [`verify_signature`].
    pub fn verify(
        &self,
        parts: &http::request::Parts,
        body: &[u8],
    ) -> Result<Option<Authentication>, AuthError> {
        verify_signature(parts, body, self.registry.as_ref())
    }
}
