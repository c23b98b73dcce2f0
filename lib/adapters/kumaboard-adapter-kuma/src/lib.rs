//! Uptime Kuma metrics source.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use kumaboard_domain::UptimeKumaConfig;
use kumaboard_ports::MetricsPort;

/// Fetches the `/metrics` exposition using the static API key.
#[derive(Debug, Clone)]
pub struct KumaClient {
    client: Client,
    metrics_url: String,
    api_key: String,
}

impl KumaClient {
    pub fn new(config: &UptimeKumaConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build metrics http client")?;
        Ok(Self {
            client,
            metrics_url: config.metrics_url(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn metrics_url(&self) -> &str {
        &self.metrics_url
    }
}

#[async_trait]
impl MetricsPort for KumaClient {
    async fn fetch(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.metrics_url)
            .basic_auth("", Some(&self.api_key))
            .send()
            .await
            .with_context(|| format!("failed to send request to {}", self.metrics_url))?;

        let status = response.status();
        if status != StatusCode::OK {
            anyhow::bail!("unexpected status code: {}", status.as_u16());
        }

        let body = response
            .text()
            .await
            .context("failed to read response body")?;
        debug!(bytes = body.len(), "Fetched metrics");
        Ok(body)
    }
}
