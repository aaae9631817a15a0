// src/web_crawler/orchestrator.rs
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::config::CrawlerSettings;
use crate::web_crawler::crawler::SiteCrawler;
use crate::web_crawler::error_stats::{is_critical_error, BreakPolicy, ErrorStats};
use crate::web_crawler::fetcher::PageFetcher;
use crate::web_crawler::progress::{CompletedUrl, ProgressHandle, UrlStatus};
use crate::web_crawler::types::{CrawlOptions, SiteResult};

/// Aggregate counters for one finished batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStatistics {
    pub total_urls: usize,
    pub processed: usize,
    pub successful: usize,
    pub errors: usize,
    pub skipped: usize,
    pub error_rate: f64,
    pub consecutive_errors: u32,
    pub critical_errors: u32,
}

/// Everything a finished batch hands back to the caller.
#[derive(Debug)]
pub struct BatchOutcome {
    pub batch_id: String,
    pub results: Vec<SiteResult>,
    pub statistics: BatchStatistics,
    pub error_stats: ErrorStats,
    pub duration_ms: u64,
}

/// Drives one batch of seed URLs strictly sequentially, governs failures
/// through the break policy, and mirrors every step into shared progress.
pub struct BatchOrchestrator {
    crawler: SiteCrawler,
    policy: BreakPolicy,
    settings: CrawlerSettings,
    progress: ProgressHandle,
}

impl BatchOrchestrator {
    pub fn new(settings: CrawlerSettings, policy: BreakPolicy, progress: ProgressHandle) -> Self {
        Self {
            crawler: SiteCrawler::new(settings.clone()),
            policy,
            settings,
            progress,
        }
    }

    pub fn progress(&self) -> &ProgressHandle {
        &self.progress
    }

    /// Exactly one result row per submitted URL comes back, in submission
    /// order, whether the URL succeeded, failed or was skipped after a
    /// break. `original_rows` carries the uploaded spreadsheet rows to echo
    /// into results, aligned by index.
    pub async fn run_batch(
        &self,
        fetcher: &dyn PageFetcher,
        urls: &[String],
        original_rows: Option<&[Map<String, Value>]>,
        options: &CrawlOptions,
    ) -> BatchOutcome {
        let batch_start = Instant::now();
        let batch_id = self.progress.begin_batch(urls.len()).await;
        let mut stats = ErrorStats::default();
        let mut results: Vec<SiteResult> = Vec::with_capacity(urls.len());

        info!("🚀 Batch {} started: {} URL(s)", batch_id, urls.len());

        for (index, url) in urls.iter().enumerate() {
            self.progress.set_current(index, url).await;

            // Conditions may have been crossed by the previous URL.
            if let Some(reason) = self.policy.evaluate(&stats, index) {
                warn!("🛑 Breaking batch at {}/{}: {}", index, urls.len(), reason);
                stats.mark_break(&reason);
                self.skip_remaining(urls, original_rows, index, &reason, &mut results, &stats)
                    .await;
                break;
            }

            let started = Instant::now();
            match self.crawler.crawl(fetcher, url, options).await {
                Ok(mut site) => {
                    site.original_data = row_for(original_rows, index);
                    stats.record_success();
                    info!(
                        "✅ [{}/{}] {} · {} email(s), {} social link(s)",
                        index + 1,
                        urls.len(),
                        url,
                        site.emails.len(),
                        site.social_links.count()
                    );
                    let entry = CompletedUrl {
                        index,
                        url: url.clone(),
                        status: UrlStatus::Success,
                        emails: site.emails.len(),
                        error: site.error.clone(),
                        duration: started.elapsed().as_millis() as u64,
                    };
                    self.progress.record(entry, site.clone(), &stats).await;
                    results.push(site);
                }
                Err(e) => {
                    let message = e.to_string();
                    let critical = is_critical_error(&message);
                    stats.record_failure(critical);
                    warn!(
                        "❌ [{}/{}] {} · {}{}",
                        index + 1,
                        urls.len(),
                        url,
                        message,
                        if critical { " (critical)" } else { "" }
                    );
                    let mut site = SiteResult::from_failure(url, &message, critical);
                    site.original_data = row_for(original_rows, index);
                    let entry = CompletedUrl {
                        index,
                        url: url.clone(),
                        status: UrlStatus::Error,
                        emails: 0,
                        error: Some(message),
                        duration: started.elapsed().as_millis() as u64,
                    };
                    self.progress.record(entry, site.clone(), &stats).await;
                    results.push(site);

                    // A critical failure may cross a threshold mid-loop, in
                    // which case the remaining URLs are not worth attempting.
                    if critical {
                        if let Some(reason) = self.policy.evaluate(&stats, index) {
                            warn!("🛑 Critical failure ended the batch: {}", reason);
                            stats.mark_break(&reason);
                            self.skip_remaining(
                                urls,
                                original_rows,
                                index + 1,
                                &reason,
                                &mut results,
                                &stats,
                            )
                            .await;
                            break;
                        }
                    }
                }
            }

            if index + 1 < urls.len() {
                tokio::time::sleep(Duration::from_millis(self.settings.request_delay_ms)).await;
            }
        }

        let statistics = summarize(urls.len(), &results, &stats);
        self.progress.finish(&stats).await;
        let duration_ms = batch_start.elapsed().as_millis() as u64;
        info!(
            "🏁 Batch {} done in {}ms: {} ok, {} failed, {} skipped",
            batch_id, duration_ms, statistics.successful, statistics.errors, statistics.skipped
        );

        BatchOutcome {
            batch_id,
            results,
            statistics,
            error_stats: stats,
            duration_ms,
        }
    }

    /// Marks every URL from `from` onward as skipped with the break reason.
    async fn skip_remaining(
        &self,
        urls: &[String],
        original_rows: Option<&[Map<String, Value>]>,
        from: usize,
        reason: &str,
        results: &mut Vec<SiteResult>,
        stats: &ErrorStats,
    ) {
        for index in from..urls.len() {
            let mut site = SiteResult::from_skip(&urls[index], reason);
            site.original_data = row_for(original_rows, index);
            let entry = CompletedUrl {
                index,
                url: urls[index].clone(),
                status: UrlStatus::Skipped,
                emails: 0,
                error: Some(reason.to_string()),
                duration: 0,
            };
            self.progress.record(entry, site.clone(), stats).await;
            results.push(site);
        }
    }
}

fn row_for(rows: Option<&[Map<String, Value>]>, index: usize) -> Option<Map<String, Value>> {
    rows.and_then(|rows| rows.get(index)).cloned()
}

fn summarize(total_urls: usize, results: &[SiteResult], stats: &ErrorStats) -> BatchStatistics {
    let skipped = results.iter().filter(|r| r.is_skipped()).count();
    let processed = results.len() - skipped;
    let errors = stats.total_errors as usize;
    let successful = processed.saturating_sub(errors);
    let error_rate = if processed > 0 {
        errors as f64 / processed as f64
    } else {
        0.0
    };
    BatchStatistics {
        total_urls,
        processed,
        successful,
        errors,
        skipped,
        error_rate,
        consecutive_errors: stats.consecutive_errors,
        critical_errors: stats.critical_errors,
    }
}
