use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::constants::notify::WEBHOOK_TIMEOUT_SECONDS;

#[derive(Debug, Clone, Serialize)]
pub struct OperatorPayload {
    pub timestamp: DateTime<Utc>,
    pub command: String,
    pub source: String,
}

/// Delivers operator-level commands to an external channel over a webhook
#[derive(Clone)]
pub struct OperatorService {
    webhook_url: String,
    client: Client,
}

impl OperatorService {
    pub fn new(webhook_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(WEBHOOK_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client for OperatorService: {}", e))?;

        Ok(Self {
            webhook_url,
            client,
        })
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        !self.webhook_url.is_empty()
    }

    pub fn get_webhook_url(&self) -> &str {
        &self.webhook_url
    }

    pub async fn send_command(&self, command: &str) -> Result<()> {
        let payload = OperatorPayload {
            timestamp: Utc::now(),
            command: command.to_string(),
            source: "snaptaker".to_string(),
        };
        self.send_webhook(&payload).await
    }

    /// Startup connectivity check
    pub async fn test_webhook(&self) -> Result<()> {
        if !self.is_enabled() {
            return Err(anyhow!("No operator webhook URL configured"));
        }

        let payload = OperatorPayload {
            timestamp: Utc::now(),
            command: "say snaptaker operator channel test".to_string(),
            source: "snaptaker-startup".to_string(),
        };

        let response = timeout(
            Duration::from_secs(WEBHOOK_TIMEOUT_SECONDS),
            self.client.post(&self.webhook_url).json(&payload).send(),
        )
        .await
        .map_err(|_| anyhow!("Operator webhook timed out"))??;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(anyhow!("Operator webhook returned HTTP {}", response.status()))
        }
    }

    // Delivery problems are logged, never propagated to the cycle
    async fn send_webhook(&self, payload: &OperatorPayload) -> Result<()> {
        if !self.is_enabled() {
            debug!("No operator webhook configured, skipping command '{}'", payload.command);
            return Ok(());
        }

        match timeout(
            Duration::from_secs(WEBHOOK_TIMEOUT_SECONDS),
            self.client.post(&self.webhook_url).json(payload).send(),
        )
        .await
        {
            Ok(Ok(response)) => {
                if response.status().is_success() {
                    info!("Operator command delivered: {}", payload.command);
                } else {
                    warn!(
                        "Operator webhook returned status {} for '{}'",
                        response.status(),
                        payload.command
                    );
                }
            }
            Ok(Err(e)) => {
                warn!("Failed to deliver operator command '{}': {}", payload.command, e);
            }
            Err(_) => {
                warn!("Operator webhook timeout for '{}'", payload.command);
            }
        }

        Ok(())
    }
}
