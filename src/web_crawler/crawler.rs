// src/web_crawler/crawler.rs
use std::time::Duration;

use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use crate::config::CrawlerSettings;
use crate::models::Result;
use crate::web_crawler::block_detector::detect_region_block;
use crate::web_crawler::contact_extractor::{ensure_scheme, ContactExtractor};
use crate::web_crawler::fetcher::{FetchOptions, FetchedPage, PageFetcher};
use crate::web_crawler::types::{CrawlOptions, SiteResult};

/// Crawls one seed URL at a time: homepage fetch, extraction, then an
/// optional single round of secondary pages. Holds no network state of its
/// own; pages come through the fetcher it is handed.
pub struct SiteCrawler {
    extractor: ContactExtractor,
    settings: CrawlerSettings,
}

impl SiteCrawler {
    pub fn new(settings: CrawlerSettings) -> Self {
        Self {
            extractor: ContactExtractor::new(),
            settings,
        }
    }

    /// The only error that escapes is a failed homepage fetch; everything
    /// after that degrades into a thinner result instead of failing.
    pub async fn crawl(
        &self,
        fetcher: &dyn PageFetcher,
        seed_url: &str,
        options: &CrawlOptions,
    ) -> Result<SiteResult> {
        let target = ensure_scheme(seed_url.trim());
        info!("🕷️ Crawling {}", target);

        let homepage_options = FetchOptions {
            timeout: Duration::from_millis(options.timeout_ms),
            settle: Duration::from_millis(self.settings.homepage_settle_ms),
        };
        let homepage = fetcher
            .fetch(&target, &homepage_options)
            .await
            .map_err(|e| format!("Failed to scrape {}: {}", seed_url, e))?;

        let mut result = SiteResult::new(seed_url);
        self.extract_into(&mut result, &homepage, options);

        if options.max_depth == 0 {
            debug!("maxDepth is 0, not following links on {}", target);
            return Ok(result);
        }

        if options.smart_crawling && !result.emails.is_empty() {
            result.optimization_note = Some(format!(
                "Smart crawling: {} email(s) found on the homepage, secondary pages skipped",
                result.emails.len()
            ));
            info!(
                "⚡ {} satisfied by homepage ({} emails), skipping deep crawl",
                target,
                result.emails.len()
            );
            return Ok(result);
        }

        self.deep_crawl(fetcher, &target, &homepage.html, &mut result, options)
            .await;
        Ok(result)
    }

    fn extract_into(&self, result: &mut SiteResult, page: &FetchedPage, options: &CrawlOptions) {
        result.merge_emails(self.extractor.extract_emails(&page.text));
        result.merge_emails(self.extractor.extract_emails_from_html(&page.html));
        result.merge_social_links(&self.extractor.extract_social_links(&page.text, &page.html));
        if options.extract_phone_numbers {
            result.merge_phone_numbers(self.extractor.extract_phone_numbers(&page.text));
        }
        if options.extract_addresses {
            result.merge_addresses(self.extractor.extract_addresses(&page.text));
        }
    }

    /// Visits the candidate pages for contact details. Individual fetch
    /// failures are logged and swallowed; block verdicts are recorded as an
    /// advisory error without failing the site.
    async fn deep_crawl(
        &self,
        fetcher: &dyn PageFetcher,
        target: &str,
        homepage_html: &str,
        result: &mut SiteResult,
        options: &CrawlOptions,
    ) {
        let candidates = self.candidate_links(homepage_html, target);
        if candidates.is_empty() {
            debug!("No candidate links on {}", target);
            return;
        }
        debug!("Following {} candidate link(s) on {}", candidates.len(), target);

        let link_options = FetchOptions {
            timeout: Duration::from_millis(self.settings.link_timeout_ms),
            settle: Duration::from_millis(self.settings.link_settle_ms),
        };

        for link in candidates {
            let page = match fetcher.fetch(&link, &link_options).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("Secondary page {} failed: {}", link, e);
                    continue;
                }
            };

            if let Some(message) = detect_region_block(&page.html, &link) {
                warn!("🚧 Block page detected at {}", link);
                append_block_notice(&mut result.error, &message);
                continue;
            }

            self.extract_into(result, &page, options);
        }
    }

    /// Contact-like links first, then generic absolute links, deduplicated,
    /// seed excluded, capped.
    fn candidate_links(&self, homepage_html: &str, target: &str) -> Vec<String> {
        let mut candidates = self.extractor.find_contact_like_links(homepage_html, target);
        for link in harvest_absolute_links(homepage_html, self.settings.max_generic_links) {
            if !candidates.contains(&link) {
                candidates.push(link);
            }
        }
        let seed = target.trim_end_matches('/');
        candidates.retain(|link| link.trim_end_matches('/') != seed);
        candidates.truncate(self.settings.max_candidate_links);
        candidates
    }
}

/// Records a block message on the result without stacking duplicate
/// advisories from multiple blocked pages.
fn append_block_notice(slot: &mut Option<String>, message: &str) {
    match slot {
        None => *slot = Some(message.to_string()),
        Some(existing) => {
            if !existing.contains("VPN") {
                existing.push_str("; ");
                existing.push_str(message);
            }
        }
    }
}

/// First `limit` distinct absolute links in document order.
fn harvest_absolute_links(html: &str, limit: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").unwrap();
    let mut links = Vec::new();
    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            let href = href.trim();
            if !(href.starts_with("http://") || href.starts_with("https://")) {
                continue;
            }
            let href = href.to_string();
            if !links.contains(&href) {
                links.push(href);
                if links.len() == limit {
                    break;
                }
            }
        }
    }
    links
}
