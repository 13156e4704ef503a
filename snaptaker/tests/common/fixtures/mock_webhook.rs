//! Mock webhook server for testing operator command delivery
//!
//! This simulates the operator channel endpoint, allowing tests to verify
//! commands are sent with the expected payload.

use serde_json::Value;
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Mock webhook server that captures operator commands
pub struct MockWebhookServer {
    pub server: MockServer,
    pub base_url: String,
}

impl MockWebhookServer {
    /// Create a new mock webhook server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    /// Mock successful webhook delivery
    pub async fn mock_success(&self) {
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&self.server)
            .await;
    }

    /// Mock webhook failure
    pub async fn mock_failure(&self, status_code: u16) {
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .respond_with(ResponseTemplate::new(status_code))
            .mount(&self.server)
            .await;
    }

    /// Captured JSON bodies, in arrival order
    pub async fn get_captured_requests(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|req| req.body_json::<Value>().ok())
            .collect()
    }

    /// Get the number of webhook requests received
    pub async fn request_count(&self) -> usize {
        self.get_captured_requests().await.len()
    }

    /// Poll until `count` requests arrived or `within` elapsed
    pub async fn wait_for_requests(&self, count: usize, within: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + within;
        while tokio::time::Instant::now() < deadline {
            if self.request_count().await >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.request_count().await >= count
    }

    /// Get the webhook URL
    pub fn webhook_url(&self) -> String {
        format!("{}/webhook", self.base_url)
    }

    /// Verify that an operator command was sent
    pub async fn assert_command_sent(&self, command: &str) -> bool {
        self.get_captured_requests().await.iter().any(|body| {
            body.get("command")
                .and_then(|v| v.as_str())
                .map(|v| v == command)
                .unwrap_or(false)
        })
    }
}
