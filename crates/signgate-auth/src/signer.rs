//! Outbound request signing.
//!
//! [`RequestSigner`] stamps a request with a `Date` header and an
//! `Authorization: SignedRequest <KeyId>:<Signature>` header. The headers
//! are produced as a [`SignatureHeaders`] value first, so a caller can apply
//! them to whatever request type its HTTP client uses.

use std::fmt;

use chrono::{DateTime, Utc};
use http::header::{AUTHORIZATION, DATE, HeaderMap, HeaderValue};
use tracing::debug;
use uuid::Uuid;

use crate::canonical::{
    authorization_value, build_string_to_sign, compute_signature, format_date, hash_body,
};
use crate::error::AuthError;
use crate::registry::ClientRegistry;

/// The two header values that authenticate a signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeaders {
    /// Value of the `Date` header.
    pub date: String,
    /// Value of the `Authorization` header.
    pub authorization: String,
}

impl SignatureHeaders {
    /// Insert both headers into `headers`, replacing existing values.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Signing`] if a value is not a valid header value.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<(), AuthError> {
        headers.insert(DATE, header_value(&self.date)?);
        headers.insert(AUTHORIZATION, header_value(&self.authorization)?);
        Ok(())
    }
}

/// Signs outgoing requests on behalf of one client.
///
/// # Examples
///
/// ```
/// use signgate_auth::signer::RequestSigner;
/// use uuid::Uuid;
///
/// let signer = RequestSigner::new(Uuid::nil(), "topsecret").unwrap();
/// let request = http::Request::post("http://localhost:8080/orders")
///     .body(b"{}".to_vec())
///     .unwrap();
///
/// let signed = signer.sign(request).unwrap();
/// assert!(signed.headers().contains_key("date"));
/// assert!(signed.headers()["authorization"].to_str().unwrap().starts_with("SignedRequest "));
/// ```
#[derive(Clone)]
pub struct RequestSigner {
    key_id: Uuid,
    secret: String,
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("key_id", &self.key_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl RequestSigner {
    /// Create a signer for `key_id` with the given shared secret.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if the secret is blank.
    pub fn new(key_id: Uuid, secret: impl Into<String>) -> Result<Self, AuthError> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(AuthError::Configuration(
                "signing secret must not be blank".to_owned(),
            ));
        }
        Ok(Self { key_id, secret })
    }

    /// Create a signer for a client resolved from `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if the client is not registered
    /// or has a blank secret, and propagates registry lookup failures.
    pub fn for_client(registry: &dyn ClientRegistry, key_id: Uuid) -> Result<Self, AuthError> {
        let client = registry.find_by_id(&key_id)?.ok_or_else(|| {
            AuthError::Configuration(format!("signing client {key_id} is not registered"))
        })?;
        Self::new(client.id, client.secret_key)
    }

    /// The key id placed in the `Authorization` header.
    #[must_use]
    pub fn key_id(&self) -> Uuid {
        self.key_id
    }

    /// Compute the signature headers for a request sent now.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Signing`] if the HMAC cannot be computed.
    pub fn signature_headers(
        &self,
        method: &http::Method,
        body: &[u8],
    ) -> Result<SignatureHeaders, AuthError> {
        self.signature_headers_at(method, body, Utc::now())
    }

    /// Compute the signature headers for a request dated `date`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Signing`] if the HMAC cannot be computed.
    pub fn signature_headers_at(
        &self,
        method: &http::Method,
        body: &[u8],
        date: DateTime<Utc>,
    ) -> Result<SignatureHeaders, AuthError> {
        let date = format_date(date);
        let body_hash = hash_body(body);
        let string_to_sign = build_string_to_sign(method.as_str(), &body_hash, &date);

        debug!(key_id = %self.key_id, string_to_sign, "built SignedRequest string to sign");

        let signature = compute_signature(&self.secret, &string_to_sign)?;
        Ok(SignatureHeaders {
            authorization: authorization_value(&self.key_id.to_string(), &signature),
            date,
        })
    }

    /// Sign `request`, returning it with `Date` and `Authorization` set.
    ///
    /// The body is hashed as-is and left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Signing`] if the signature cannot be computed.
    pub fn sign<B: AsRef<[u8]>>(
        &self,
        request: http::Request<B>,
    ) -> Result<http::Request<B>, AuthError> {
        let (mut parts, body) = request.into_parts();
        let headers = self.signature_headers(&parts.method, body.as_ref())?;
        headers.apply(&mut parts.headers)?;
        Ok(http::Request::from_parts(parts, body))
    }
}

/// Sign a single request with `key_id` and `secret`.
///
/// # Errors
///
/// Returns [`AuthError::Configuration`] if the secret is blank and
/// [`AuthError::Signing`] if the signature cannot be computed.
pub fn sign_request<B: AsRef<[u8]>>(
    request: http::Request<B>,
    key_id: Uuid,
    secret: &str,
) -> Result<http::Request<B>, AuthError> {
    RequestSigner::new(key_id, secret)?.sign(request)
}

fn header_value(value: &str) -> Result<HeaderValue, AuthError> {
    HeaderValue::from_str(value).map_err(|e| AuthError::Signing(e.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::canonical::parse_date;
    use crate::registry::{AuthorizedClient, StaticClientRegistry};

    const CLIENT_ID: Uuid = Uuid::from_u128(0x1111_1111_1111_1111_1111_1111_1111_1111);

    fn fixed_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_should_reject_blank_secret() {
        assert!(matches!(
            RequestSigner::new(CLIENT_ID, ""),
            Err(AuthError::Configuration(_))
        ));
        assert!(matches!(
            RequestSigner::new(CLIENT_ID, " \t"),
            Err(AuthError::Configuration(_))
        ));
    }

    #[test]
    fn test_should_produce_known_headers_for_empty_post() {
        let signer = RequestSigner::new(CLIENT_ID, "topsecret").unwrap();
        let headers = signer
            .signature_headers_at(&http::Method::POST, b"", fixed_date())
            .unwrap();

        assert_eq!(headers.date, "Mon, 19 Oct 2026 10:00:00 GMT");
        assert_eq!(
            headers.authorization,
            "SignedRequest 11111111-1111-1111-1111-111111111111:lb5VTxaJFCm4TrsgxSD9/1AhF/c="
        );
    }

    #[test]
    fn test_should_produce_known_headers_for_json_body() {
        let signer = RequestSigner::new(CLIENT_ID, "topsecret").unwrap();
        let headers = signer
            .signature_headers_at(&http::Method::POST, br#"{"amount":42}"#, fixed_date())
            .unwrap();
        assert!(headers.authorization.ends_with(":aDAkbpinAIuEabxxztobKSG5CJ0="));

        let get = signer
            .signature_headers_at(&http::Method::GET, b"", fixed_date())
            .unwrap();
        assert!(get.authorization.ends_with(":EZ4zR4bbSkxR016UPgMJgv0ykrE="));
    }

    #[test]
    fn test_should_be_deterministic_for_same_inputs() {
        let a = RequestSigner::new(CLIENT_ID, "topsecret").unwrap();
        let b = RequestSigner::new(CLIENT_ID, "topsecret").unwrap();
        let first = a
            .signature_headers_at(&http::Method::PUT, b"payload", fixed_date())
            .unwrap();
        let second = b
            .signature_headers_at(&http::Method::PUT, b"payload", fixed_date())
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_should_sign_request_and_keep_body() {
        let request = http::Request::post("http://localhost/orders")
            .header("content-type", "application/json")
            .body(br#"{"amount":42}"#.to_vec())
            .unwrap();

        let signed = sign_request(request, CLIENT_ID, "topsecret").unwrap();

        assert_eq!(signed.body().as_slice(), br#"{"amount":42}"#);
        assert_eq!(signed.headers()["content-type"], "application/json");
        let date = signed.headers()[DATE].to_str().unwrap();
        assert!(parse_date(date).is_ok());
        let auth = signed.headers()[AUTHORIZATION].to_str().unwrap();
        assert!(auth.starts_with("SignedRequest 11111111-1111-1111-1111-111111111111:"));
    }

    #[test]
    fn test_should_replace_existing_headers_when_applied() {
        let mut headers = HeaderMap::new();
        headers.insert(DATE, HeaderValue::from_static("stale"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer x"));

        let sig = SignatureHeaders {
            date: "Mon, 19 Oct 2026 10:00:00 GMT".to_owned(),
            authorization: "SignedRequest id:sig".to_owned(),
        };
        sig.apply(&mut headers).unwrap();

        assert_eq!(headers.get_all(DATE).iter().count(), 1);
        assert_eq!(headers[AUTHORIZATION], "SignedRequest id:sig");
    }

    #[test]
    fn test_should_resolve_signer_from_registry() {
        let registry = StaticClientRegistry::new(vec![AuthorizedClient::new(
            CLIENT_ID,
            "topsecret",
            ["USER"],
        )])
        .unwrap();

        let signer = RequestSigner::for_client(&registry, CLIENT_ID).unwrap();
        assert_eq!(signer.key_id(), CLIENT_ID);

        let unknown = RequestSigner::for_client(&registry, Uuid::nil());
        assert!(matches!(unknown, Err(AuthError::Configuration(_))));
    }

    #[test]
    fn test_should_redact_secret_in_debug_output() {
        let signer = RequestSigner::new(CLIENT_ID, "topsecret").unwrap();
        assert!(!format!("{signer:?}").contains("topsecret"));
    }
}
