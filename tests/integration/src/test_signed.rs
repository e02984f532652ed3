//! `SignedRequest` authentication integration tests.

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use reqwest::{Method, StatusCode};
    use signgate_auth::RequestSigner;
    use uuid::Uuid;

    use crate::{
        FORM_CONTENT_TYPE, TEST_CLIENT_ID, endpoint_url, http_client, send_signed, send_signed_at,
        signed_request, test_signer,
    };

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_authenticate_signed_whoami() {
        let client = http_client();

        let resp = send_signed(&client, Method::GET, "/whoami", b"", None).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = resp.json().await.expect("whoami body is JSON");
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["clientId"], TEST_CLIENT_ID.to_string());
        assert!(
            body["authorities"]
                .as_array()
                .is_some_and(|a| a.iter().any(|r| r == "ROLE_ADMIN"))
        );
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_echo_signed_form_body() {
        let client = http_client();

        let resp = send_signed(
            &client,
            Method::POST,
            "/echo",
            b"name=alice&age=30",
            Some(FORM_CONTENT_TYPE),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["x-form-params"], "2");
        assert_eq!(resp.headers()["content-type"], FORM_CONTENT_TYPE);
        assert_eq!(
            resp.bytes().await.expect("echo body").as_ref(),
            b"name=alice&age=30"
        );
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_unsigned_request() {
        let client = http_client();

        let resp = client
            .get(format!("{}/whoami", endpoint_url()))
            .send()
            .await
            .expect("request should complete");

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers()["www-authenticate"], "SignedRequest");

        let body: serde_json::Value = resp.json().await.expect("error body is JSON");
        assert_eq!(body["error"], "Unauthorized");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_tampered_body() {
        let client = http_client();
        let headers = test_signer()
            .signature_headers(&Method::POST, b"amount=10")
            .expect("signing succeeds");

        let resp = signed_request(
            &client,
            Method::POST,
            "/echo",
            b"amount=1000",
            Some(FORM_CONTENT_TYPE),
            &headers,
        )
        .send()
        .await
        .expect("request should complete");

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_stale_date() {
        let client = http_client();
        let stale = Utc::now() - Duration::minutes(20);

        let resp = send_signed_at(&client, Method::GET, "/whoami", b"", None, stale).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_accept_slightly_skewed_clock() {
        let client = http_client();
        let skewed = Utc::now() + Duration::minutes(10);

        let resp = send_signed_at(&client, Method::GET, "/whoami", b"", None, skewed).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_wrong_secret() {
        let client = http_client();
        let headers = RequestSigner::new(TEST_CLIENT_ID, "not-the-secret")
            .expect("valid signer")
            .signature_headers(&Method::GET, b"")
            .expect("signing succeeds");

        let resp = signed_request(&client, Method::GET, "/whoami", b"", None, &headers)
            .send()
            .await
            .expect("request should complete");

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_unknown_client() {
        let client = http_client();
        let headers = RequestSigner::new(Uuid::new_v4(), "whatever")
            .expect("valid signer")
            .signature_headers(&Method::GET, b"")
            .expect("signing succeeds");

        let resp = signed_request(&client, Method::GET, "/whoami", b"", None, &headers)
            .send()
            .await
            .expect("request should complete");

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_return_not_found_for_unknown_route() {
        let client = http_client();

        let resp = send_signed(&client, Method::GET, "/missing", b"", None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
