// src/config.rs
use serde::{Deserialize, Serialize};

use crate::models::Result;
use crate::web_crawler::error_stats::BreakPolicy;
use crate::web_crawler::fetcher::FetcherConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub crawler: CrawlerSettings,
    pub break_policy: BreakPolicy,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub frontend_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            frontend_origin: "http://localhost:3000".to_string(),
        }
    }
}

/// Pacing and deep-crawl limits. The defaults are deliberately polite;
/// tests dial the delays down to keep runs fast.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerSettings {
    /// Pause between consecutive seed URLs in a batch.
    pub request_delay_ms: u64,
    /// Settle pause after a homepage load.
    pub homepage_settle_ms: u64,
    /// Settle pause after a secondary page load.
    pub link_settle_ms: u64,
    /// Navigation timeout for secondary pages, shorter than the homepage one.
    pub link_timeout_ms: u64,
    /// Generic absolute links harvested from a homepage.
    pub max_generic_links: usize,
    /// Total secondary pages visited per site.
    pub max_candidate_links: usize,
    pub fetch_attempts: u32,
    pub fetch_backoff_ms: u64,
    pub fetch_timeout_cap_ms: u64,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            request_delay_ms: 2_000,
            homepage_settle_ms: 1_000,
            link_settle_ms: 500,
            link_timeout_ms: 15_000,
            max_generic_links: 5,
            max_candidate_links: 8,
            fetch_attempts: 2,
            fetch_backoff_ms: 1_000,
            fetch_timeout_cap_ms: 30_000,
        }
    }
}

impl CrawlerSettings {
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            max_attempts: self.fetch_attempts,
            backoff_ms: self.fetch_backoff_ms,
            timeout_cap_ms: self.fetch_timeout_cap_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: String,
    pub pretty_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "output".to_string(),
            pretty_json: true,
        }
    }
}

impl AppConfig {
    /// PORT and FRONTEND_ORIGIN from the environment win over config.yml.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(origin) = std::env::var("FRONTEND_ORIGIN") {
            if !origin.is_empty() {
                self.server.frontend_origin = origin;
            }
        }
    }
}

pub async fn load_config(path: &str) -> Result<AppConfig> {
    let content = tokio::fs::read_to_string(path).await?;
    let mut config: AppConfig = serde_yaml::from_str(&content)?;
    config.apply_env_overrides();
    Ok(config)
}
