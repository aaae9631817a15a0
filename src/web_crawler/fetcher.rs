// src/web_crawler/fetcher.rs
use std::cmp;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::redirect;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::models::Result;

/// One fetched page: raw markup plus the visible text derived from it.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub html: String,
    pub text: String,
}

/// Per-call fetch knobs: navigation timeout and the settle pause applied
/// after a successful load, before content is read.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub settle: Duration,
}

/// Boundary between crawling logic and page retrieval. Production uses
/// HttpFetcher; tests substitute scripted fetchers.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<FetchedPage>;
}

/// Retry and timeout knobs for HttpFetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub max_attempts: u32,
    pub backoff_ms: u64,
    pub timeout_cap_ms: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff_ms: 1_000,
            timeout_cap_ms: 30_000,
        }
    }
}

/// Desktop user agents rotated per request to avoid trivial fingerprinting.
const USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.3 Safari/605.1.15",
];

/// HTTP-backed fetcher. One instance is acquired per batch and dropped when
/// the batch exits, successfully or not.
pub struct HttpFetcher {
    client: reqwest::Client,
    config: FetcherConfig,
}

impl HttpFetcher {
    pub fn new(follow_redirects: bool) -> Result<Self> {
        Self::with_config(follow_redirects, FetcherConfig::default())
    }

    pub fn with_config(follow_redirects: bool, config: FetcherConfig) -> Result<Self> {
        let redirect_policy = if follow_redirects {
            redirect::Policy::limited(10)
        } else {
            redirect::Policy::none()
        };
        let client = reqwest::Client::builder()
            .redirect(redirect_policy)
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, config })
    }

    async fn navigate(&self, url: &str, timeout: Duration) -> Result<String> {
        let user_agent = USER_AGENTS[fastrand::usize(..USER_AGENTS.len())];
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .header(reqwest::header::USER_AGENT, user_agent)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(describe_error)?;

        if !response.status().is_success() {
            return Err(format!("HTTP error: {}", response.status()).into());
        }

        response.text().await.map_err(describe_error).map_err(Into::into)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<FetchedPage> {
        let timeout = cmp::min(options.timeout, Duration::from_millis(self.config.timeout_cap_ms));
        let mut last_error: Option<Box<dyn std::error::Error + Send + Sync>> = None;

        for attempt in 1..=self.config.max_attempts {
            match self.navigate(url, timeout).await {
                Ok(html) => {
                    if !options.settle.is_zero() {
                        // Pause so late-arriving content settles before extraction.
                        tokio::time::sleep(options.settle).await;
                    }
                    let text = visible_text(&html);
                    debug!("Fetched {} bytes from {} (attempt {})", html.len(), url, attempt);
                    return Ok(FetchedPage { html, text });
                }
                Err(e) => {
                    warn!(
                        "Attempt {}/{} failed for {}: {}",
                        attempt, self.config.max_attempts, url, e
                    );
                    last_error = Some(e);
                    if attempt < self.config.max_attempts {
                        tokio::time::sleep(Duration::from_millis(
                            self.config.backoff_ms * attempt as u64,
                        ))
                        .await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| format!("Failed to fetch {}", url).into()))
    }
}

/// Flattens a reqwest error with its source chain into one line. Error
/// classification works on substrings like "connection refused", which
/// live in the inner errors rather than the top-level message.
fn describe_error(error: reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(&error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Collapses the document into whitespace-normalized visible text. Reads
/// the body when one exists, the whole tree otherwise.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body_selector = Selector::parse("body").unwrap();
    let raw = match document.select(&body_selector).next() {
        Some(body) => body.text().collect::<Vec<_>>().join(" "),
        None => document.root_element().text().collect::<Vec<_>>().join(" "),
    };
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
