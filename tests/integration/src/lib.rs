//! Integration tests for the SignGate server.
//!
//! These tests require a running SignGate server at `localhost:8080`, started
//! with the bundled client file and authentication enforced:
//!
//! ```text
//! SIGNGATE_CLIENTS_FILE=apps/signgate-server/clients.example.json \
//! SIGNGATE_REQUIRE_AUTH=true cargo run -p signgate-server
//! ```
//!
//! They are marked `#[ignore]` so they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p signgate-integration -- --ignored
//! ```

use std::sync::Once;

use chrono::{DateTime, Utc};
use signgate_auth::{RequestSigner, SignatureHeaders};
use uuid::Uuid;

static INIT: Once = Once::new();

/// Client id registered in `clients.example.json`.
pub const TEST_CLIENT_ID: Uuid = Uuid::from_u128(0x1111_1111_1111_1111_1111_1111_1111_1111);

/// Secret of [`TEST_CLIENT_ID`].
pub const TEST_CLIENT_SECRET: &str = "topsecret";

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for the server.
#[must_use]
pub fn endpoint_url() -> String {
    std::env::var("SIGNGATE_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:8080".to_owned())
}

/// Create an HTTP client for talking to the server.
#[must_use]
pub fn http_client() -> reqwest::Client {
    init_tracing();
    reqwest::Client::new()
}

/// Signer for the registered test client.
#[must_use]
pub fn test_signer() -> RequestSigner {
    RequestSigner::new(TEST_CLIENT_ID, TEST_CLIENT_SECRET)
        .unwrap_or_else(|e| panic!("invalid test signer: {e}"))
}

/// Content type of form-encoded bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Build a request to `path` carrying the given signature headers.
#[must_use]
pub fn signed_request(
    client: &reqwest::Client,
    method: reqwest::Method,
    path: &str,
    body: &'static [u8],
    content_type: Option<&str>,
    headers: &SignatureHeaders,
) -> reqwest::RequestBuilder {
    let mut request = client
        .request(method, format!("{}{path}", endpoint_url()))
        .header(reqwest::header::DATE, &headers.date)
        .header(reqwest::header::AUTHORIZATION, &headers.authorization);
    if let Some(content_type) = content_type {
        request = request.header(reqwest::header::CONTENT_TYPE, content_type);
    }
    request.body(body)
}

/// Send a request signed by the test client, dated `date`.
pub async fn send_signed_at(
    client: &reqwest::Client,
    method: reqwest::Method,
    path: &str,
    body: &'static [u8],
    content_type: Option<&str>,
    date: DateTime<Utc>,
) -> reqwest::Response {
    tracing::debug!(%method, path, "sending signed request");
    let headers = test_signer()
        .signature_headers_at(&method, body, date)
        .unwrap_or_else(|e| panic!("failed to sign request: {e}"));
    signed_request(client, method, path, body, content_type, &headers)
        .send()
        .await
        .unwrap_or_else(|e| panic!("request to {path} failed: {e}"))
}

/// Send a request signed by the test client, dated now.
pub async fn send_signed(
    client: &reqwest::Client,
    method: reqwest::Method,
    path: &str,
    body: &'static [u8],
    content_type: Option<&str>,
) -> reqwest::Response {
    send_signed_at(client, method, path, body, content_type, Utc::now()).await
}

mod test_health;
mod test_signed;
