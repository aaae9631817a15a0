// src/web_crawler/mod.rs
pub mod block_detector;
pub mod contact_extractor;
pub mod crawler;
pub mod error_stats;
pub mod fetcher;
pub mod orchestrator;
pub mod progress;
pub mod types;

pub use block_detector::detect_region_block;
pub use contact_extractor::ContactExtractor;
pub use crawler::SiteCrawler;
pub use error_stats::{is_critical_error, BreakPolicy, ErrorStats};
pub use fetcher::{visible_text, FetchOptions, FetchedPage, FetcherConfig, HttpFetcher, PageFetcher};
pub use orchestrator::{BatchOrchestrator, BatchOutcome, BatchStatistics};
pub use progress::{BatchProgress, CompletedUrl, ProgressHandle, UrlStatus};
pub use types::{CrawlOptions, FieldError, SiteResult, SocialLinks, SocialPlatform};
