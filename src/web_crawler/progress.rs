// src/web_crawler/progress.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::web_crawler::error_stats::ErrorStats;
use crate::web_crawler::types::SiteResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlStatus {
    Success,
    Error,
    Skipped,
}

/// Per-URL completion entry shown in progress. `emails` is a count, not
/// the addresses themselves; the full data lives in the result rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedUrl {
    pub index: usize,
    pub url: String,
    pub status: UrlStatus,
    pub emails: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration: u64,
}

/// Live snapshot of the running batch, served verbatim by the status
/// endpoint. Monotonic while a batch runs, frozen once it completes, and
/// replaced wholesale when the next batch starts.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgress {
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_url: Option<String>,
    pub current_index: usize,
    pub total_urls: usize,
    pub completed_urls: Vec<CompletedUrl>,
    pub results: Vec<SiteResult>,
    pub is_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_stats: Option<ErrorStats>,
}

/// Cloneable handle around the shared progress record. The batch loop is
/// the only writer; status requests only ever take read snapshots.
#[derive(Clone, Default)]
pub struct ProgressHandle {
    inner: Arc<RwLock<BatchProgress>>,
}

impl ProgressHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> BatchProgress {
        self.inner.read().await.clone()
    }

    /// Resets the record for a new batch and returns its id.
    pub async fn begin_batch(&self, total_urls: usize) -> String {
        let batch_id = Uuid::new_v4().to_string();
        let mut progress = self.inner.write().await;
        *progress = BatchProgress {
            is_active: true,
            batch_id: Some(batch_id.clone()),
            total_urls,
            start_time: Some(Utc::now()),
            ..BatchProgress::default()
        };
        batch_id
    }

    pub async fn set_current(&self, index: usize, url: &str) {
        let mut progress = self.inner.write().await;
        progress.current_index = index;
        progress.current_url = Some(url.to_string());
    }

    /// Appends one finished URL along with its result row and the error
    /// counters as of that URL.
    pub async fn record(&self, entry: CompletedUrl, result: SiteResult, stats: &ErrorStats) {
        let mut progress = self.inner.write().await;
        progress.completed_urls.push(entry);
        progress.results.push(result);
        progress.error_stats = Some(stats.clone());
    }

    pub async fn finish(&self, stats: &ErrorStats) {
        let mut progress = self.inner.write().await;
        progress.is_active = false;
        progress.is_complete = true;
        progress.error_stats = Some(stats.clone());
    }

    /// Used when a batch cannot start at all, e.g. the fetch session failed
    /// to come up. Leaves the record inactive and not complete.
    pub async fn reset_inactive(&self, total_urls: usize) {
        let mut progress = self.inner.write().await;
        *progress = BatchProgress {
            total_urls,
            ..BatchProgress::default()
        };
    }
}
