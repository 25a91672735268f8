// src/collector/client.rs
//
// HTTP client for the device web interface
// Performs the single unauthenticated GET and splits the body into lines

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use log::{debug, error, info};
use reqwest::Client;
use std::time::Instant;

use crate::config::DeviceSettings;

/// Client for one device
pub struct DeviceClient {
    client: Client,
    url: String,
}

impl DeviceClient {
    /// Create a client for the device at `address`.
    ///
    /// A bare host or IP is reached over plain HTTP; an address that
    /// already carries a scheme is used as the base URL.
    pub fn new(address: &str, settings: &DeviceSettings) -> Result<Self> {
        // Devices sit on the local network, never behind the host's proxy
        let mut builder = Client::builder().user_agent("webups-agent").no_proxy();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: endpoint_url(address, &settings.endpoint_path),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the status page and return its lines
    pub async fn fetch_lines(&self) -> Result<Vec<String>> {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();
        let start_time = Instant::now();

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to reach device at {}", self.url))?;

        let status = response.status();
        let duration = start_time.elapsed().as_millis();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                "[{}] GET - {}ms - {} - {} ERROR ({})",
                timestamp,
                duration,
                self.url,
                status.as_u16(),
                body.trim()
            );
            return Err(anyhow!("Device returned error status {}", status));
        }

        let body = response
            .text()
            .await
            .context("Failed to read device response body")?;
        let lines = split_lines(&body);

        info!(
            "[{}] GET - {}ms - {} - {} OK ({} lines)",
            timestamp,
            duration,
            self.url,
            status.as_u16(),
            lines.len()
        );
        debug!("Device response: {:?}", lines);

        Ok(lines)
    }
}

/// Build the status page URL from a device address and path
fn endpoint_url(address: &str, path: &str) -> String {
    let base = address.trim().trim_end_matches('/');
    let base = if base.contains("://") {
        base.to_string()
    } else {
        format!("http://{}", base)
    };

    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Split a response body into lines, accepting both `\n` and `\r\n`
pub fn split_lines(body: &str) -> Vec<String> {
    body.lines().map(ToString::to_string).collect()
}
