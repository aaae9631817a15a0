// src/api/scrape.rs
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{post, State};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{error, info};

use crate::export::{ExportFiles, ResultExporter};
use crate::server::ServerState;
use crate::web_crawler::error_stats::ErrorStats;
use crate::web_crawler::fetcher::HttpFetcher;
use crate::web_crawler::orchestrator::BatchStatistics;
use crate::web_crawler::types::{CrawlOptions, FieldError, SiteResult};

/// Hard cap on batch size; larger uploads should be split client-side.
pub const MAX_URLS_PER_BATCH: usize = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    pub urls: Vec<String>,
    /// Original spreadsheet rows, aligned with `urls` by index. Echoed
    /// into results and the CSV export untouched.
    #[serde(default)]
    pub csv_data: Option<Vec<Map<String, Value>>>,
    #[serde(default)]
    pub options: Option<CrawlOptions>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResponse {
    pub success: bool,
    pub message: String,
    pub duration: u64,
    pub statistics: BatchStatistics,
    pub error_break_info: ErrorStats,
    pub results: Vec<SiteResult>,
    pub files: ExportFiles,
}

type ScrapeFailure = status::Custom<Json<Value>>;

fn failure(code: Status, message: &str, errors: Vec<FieldError>) -> ScrapeFailure {
    status::Custom(
        code,
        Json(json!({
            "success": false,
            "message": message,
            "errors": errors,
        })),
    )
}

fn validate(request: &ScrapeRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if request.urls.is_empty() {
        errors.push(FieldError::new("urls", "at least one URL is required"));
    } else if request.urls.len() > MAX_URLS_PER_BATCH {
        errors.push(FieldError::new(
            "urls",
            format!("at most {} URLs per batch", MAX_URLS_PER_BATCH),
        ));
    }
    for (index, url) in request.urls.iter().enumerate() {
        if url.trim().is_empty() {
            errors.push(FieldError::new(
                format!("urls[{}]", index),
                "URL must not be blank",
            ));
        }
    }
    if let Some(options) = &request.options {
        errors.extend(options.validation_errors());
    }
    errors
}

/// Runs one scraping batch synchronously and responds when it is done.
/// Progress is readable on /api/scraping-status while this is running.
#[post("/scrape", format = "json", data = "<request>")]
pub async fn scrape_urls(
    state: &State<ServerState>,
    request: Json<ScrapeRequest>,
) -> Result<Json<ScrapeResponse>, ScrapeFailure> {
    let request = request.into_inner();

    let validation_errors = validate(&request);
    if !validation_errors.is_empty() {
        return Err(failure(
            Status::BadRequest,
            "Validation failed",
            validation_errors,
        ));
    }

    // One batch at a time. A second submission is rejected, not queued.
    let _batch_guard = match state.batch_gate.try_lock() {
        Ok(guard) => guard,
        Err(_) => {
            return Err(failure(
                Status::Conflict,
                "A scraping batch is already running",
                Vec::new(),
            ))
        }
    };

    let options = request.options.unwrap_or_default();
    info!(
        "📥 Scrape request: {} URL(s), maxDepth={}, smartCrawling={}",
        request.urls.len(),
        options.max_depth,
        options.smart_crawling
    );

    let fetcher = match HttpFetcher::with_config(
        options.follow_redirects,
        state.config.crawler.fetcher_config(),
    ) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            error!("Could not start a fetch session: {}", e);
            state.progress.reset_inactive(request.urls.len()).await;
            return Err(failure(
                Status::InternalServerError,
                &format!("Could not start a fetch session: {}", e),
                Vec::new(),
            ));
        }
    };

    let outcome = state
        .orchestrator
        .run_batch(&fetcher, &request.urls, request.csv_data.as_deref(), &options)
        .await;

    let exporter = ResultExporter::new(
        &state.config.output.directory,
        state.config.output.pretty_json,
    );
    let files = match exporter.export_batch(&outcome.results).await {
        Ok(files) => files,
        Err(e) => {
            error!("Failed to persist batch artifacts: {}", e);
            return Err(failure(
                Status::InternalServerError,
                &format!("Scrape finished but exporting results failed: {}", e),
                Vec::new(),
            ));
        }
    };

    let message = match &outcome.error_stats.break_reason {
        Some(reason) => format!("Batch stopped early: {}", reason),
        None => format!(
            "Scraped {} URL(s): {} successful, {} failed",
            outcome.statistics.total_urls,
            outcome.statistics.successful,
            outcome.statistics.errors
        ),
    };

    Ok(Json(ScrapeResponse {
        success: true,
        message,
        duration: outcome.duration_ms,
        statistics: outcome.statistics,
        error_break_info: outcome.error_stats,
        results: outcome.results,
        files,
    }))
}
