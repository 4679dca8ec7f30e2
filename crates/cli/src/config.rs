//! Client configuration.
//!
//! Reads `~/.barber-queue/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use queue_client::ClientConfig;
use queue_sync::Page;
use serde::{Deserialize, Serialize};

/// Configuration file for the terminal client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the queue service, including the `/api` prefix.
    pub api_url: String,

    /// Customer page refresh interval in seconds.
    pub customer_poll_secs: u64,

    /// Dashboard refresh interval in seconds.
    pub dashboard_poll_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: ClientConfig::default().base_url,
            customer_poll_secs: Page::Customer.default_poll_interval().as_secs(),
            dashboard_poll_secs: Page::Dashboard.default_poll_interval().as_secs(),
        }
    }
}

impl AppConfig {
    /// Default config file path: ~/.barber-queue/config.toml.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Apply command-line overrides.
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        self
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_url.clone())
    }

    /// Refresh interval for a page; zero falls back to the page default.
    pub fn poll_interval(&self, page: Page) -> Duration {
        let secs = match page {
            Page::Customer => self.customer_poll_secs,
            Page::Dashboard => self.dashboard_poll_secs,
        };
        if secs == 0 {
            page.default_poll_interval()
        } else {
            Duration::from_secs(secs)
        }
    }
}

fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".barber-queue")
}
