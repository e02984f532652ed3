//! Canonical string construction for the `SignedRequest` scheme.
//!
//! Both the signer and the verifier derive the same string from a request:
//!
//! ```text
//! HTTP-Verb + "\n" +
//! Base64(MD5(Body)) + "\n" +
//! Date
//! ```
//!
//! and sign it with `Base64(HMAC-SHA1(Secret, StringToSign))`. The request
//! carries the result in its `Authorization` header:
//!
//! ```text
//! SignedRequest <KeyId>:<Signature>
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, NaiveDateTime, Utc};
use hmac::{Hmac, KeyInit, Mac};
use md5::{Digest, Md5};
use sha1::Sha1;

use crate::error::AuthError;

type HmacSha1 = Hmac<Sha1>;

/// Scheme prefix of the `Authorization` header, including the trailing space.
pub const SIGNED_REQUEST_PREFIX: &str = "SignedRequest ";

/// `strftime` pattern for the `Date` header (`EEE, dd MMM yyyy HH:mm:ss z`).
///
/// chrono always renders day and month names in English, so the output does
/// not depend on the host locale.
pub const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Base64 of the MD5 digest of an empty body.
pub const EMPTY_BODY_HASH: &str = "1B2M2Y8AsgTpgAmY7PhCfg==";

/// Hash a request body: `Base64(MD5(body))`.
///
/// An absent body is hashed as the empty byte sequence.
///
/// # Examples
///
/// ```
/// use signgate_auth::canonical::{EMPTY_BODY_HASH, hash_body};
///
/// assert_eq!(hash_body(b""), EMPTY_BODY_HASH);
/// ```
#[must_use]
pub fn hash_body(body: &[u8]) -> String {
    BASE64.encode(Md5::digest(body))
}

/// Build the string to sign from its three fields.
///
/// # Examples
///
/// ```
/// use signgate_auth::canonical::build_string_to_sign;
///
/// let sts = build_string_to_sign(
///     "POST",
///     "1B2M2Y8AsgTpgAmY7PhCfg==",
///     "Mon, 19 Oct 2026 10:00:00 GMT",
/// );
/// assert_eq!(sts, "POST\n1B2M2Y8AsgTpgAmY7PhCfg==\nMon, 19 Oct 2026 10:00:00 GMT");
/// ```
#[must_use]
pub fn build_string_to_sign(method: &str, body_hash: &str, date: &str) -> String {
    format!("{method}\n{body_hash}\n{date}")
}

/// Compute the signature: `Base64(HMAC-SHA1(secret, string_to_sign))`.
///
/// The secret's raw UTF-8 bytes are the HMAC key.
///
/// # Errors
///
/// Returns [`AuthError::Signing`] if the MAC cannot be keyed.
pub fn compute_signature(secret: &str, string_to_sign: &str) -> Result<String, AuthError> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|e| AuthError::Signing(e.to_string()))?;
    mac.update(string_to_sign.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Format an instant as a `Date` header value.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use signgate_auth::canonical::format_date;
///
/// let instant = Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap();
/// assert_eq!(format_date(instant), "Mon, 19 Oct 2026 10:00:00 GMT");
/// ```
#[must_use]
pub fn format_date(instant: DateTime<Utc>) -> String {
    instant.format(DATE_FORMAT).to_string()
}

/// Parse a `Date` header value into an instant.
///
/// Accepts RFC 2822 dates (which covers `GMT`, `UT` and numeric offsets)
/// and the `UTC` zone name some clients emit.
///
/// # Errors
///
/// Returns [`AuthError::MalformedRequest`] if the value cannot be parsed.
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, AuthError> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    value
        .strip_suffix(" UTC")
        .and_then(|local| NaiveDateTime::parse_from_str(local, "%a, %d %b %Y %H:%M:%S").ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AuthError::MalformedRequest(format!("unparseable Date header: {value}")))
}

/// Build the `Authorization` header value for a key id and signature.
#[must_use]
pub fn authorization_value(key_id: &str, signature: &str) -> String {
    format!("{SIGNED_REQUEST_PREFIX}{key_id}:{signature}")
}

/// Check whether an `Authorization` header uses the `SignedRequest` scheme.
#[must_use]
pub fn is_signed_request(auth_header: &str) -> bool {
    auth_header.starts_with(SIGNED_REQUEST_PREFIX)
}

/// Split a `SignedRequest KeyId:Signature` header into its two parts.
///
/// The split happens on the first colon after the prefix; Base64 never
/// contains a colon, so the signature is everything after it.
///
/// # Errors
///
/// Returns [`AuthError::MalformedRequest`] if the prefix or the separator is
/// missing, or either side is empty.
pub fn parse_authorization_header(header: &str) -> Result<(&str, &str), AuthError> {
    let rest = header.strip_prefix(SIGNED_REQUEST_PREFIX).ok_or_else(|| {
        AuthError::MalformedRequest("missing SignedRequest scheme".to_owned())
    })?;

    let (key_id, signature) = rest.split_once(':').ok_or_else(|| {
        AuthError::MalformedRequest("missing key id separator".to_owned())
    })?;

    if key_id.is_empty() || signature.is_empty() {
        return Err(AuthError::MalformedRequest(
            "empty key id or signature".to_owned(),
        ));
    }

    Ok((key_id, signature))
}
