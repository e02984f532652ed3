//! Health endpoint integration tests.

#[cfg(test)]
mod tests {
    use crate::{endpoint_url, http_client};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_running_without_signature() {
        let client = http_client();

        let resp = client
            .get(format!("{}/health", endpoint_url()))
            .send()
            .await
            .expect("health request should complete");

        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        assert_eq!(resp.headers()["server"], "SignGate");
        assert!(resp.headers().contains_key("x-request-id"));

        let body: serde_json::Value = resp.json().await.expect("health body is JSON");
        assert_eq!(body["status"], "running");
    }
}
