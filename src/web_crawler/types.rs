// src/web_crawler/types.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-batch crawl options. Fixed once a batch starts; every URL in the
/// batch is crawled with the same options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrawlOptions {
    pub max_depth: u8,
    pub timeout_ms: u64,
    pub follow_redirects: bool,
    pub extract_phone_numbers: bool,
    pub extract_addresses: bool,
    pub smart_crawling: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_depth: 1,
            timeout_ms: 30_000,
            follow_redirects: true,
            extract_phone_numbers: false,
            extract_addresses: false,
            smart_crawling: true,
        }
    }
}

impl CrawlOptions {
    pub const MAX_DEPTH_LIMIT: u8 = 3;
    pub const MIN_TIMEOUT_MS: u64 = 5_000;
    pub const MAX_TIMEOUT_MS: u64 = 60_000;

    /// Field-level validation errors. Empty when the options are acceptable.
    pub fn validation_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.max_depth > Self::MAX_DEPTH_LIMIT {
            errors.push(FieldError::new(
                "options.maxDepth",
                format!("maxDepth must be between 0 and {}", Self::MAX_DEPTH_LIMIT),
            ));
        }
        if self.timeout_ms < Self::MIN_TIMEOUT_MS || self.timeout_ms > Self::MAX_TIMEOUT_MS {
            errors.push(FieldError::new(
                "options.timeoutMs",
                format!(
                    "timeoutMs must be between {} and {}",
                    Self::MIN_TIMEOUT_MS,
                    Self::MAX_TIMEOUT_MS
                ),
            ));
        }
        errors
    }
}

/// One rejected request field with a human-readable reason.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Social platforms tracked per site, in the order they appear in results
/// and CSV columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocialPlatform {
    Facebook,
    Twitter,
    Linkedin,
    Instagram,
    Youtube,
    Tiktok,
    Pinterest,
    Snapchat,
    Reddit,
    Telegram,
    Whatsapp,
    Discord,
}

impl SocialPlatform {
    pub const ALL: [SocialPlatform; 12] = [
        SocialPlatform::Facebook,
        SocialPlatform::Twitter,
        SocialPlatform::Linkedin,
        SocialPlatform::Instagram,
        SocialPlatform::Youtube,
        SocialPlatform::Tiktok,
        SocialPlatform::Pinterest,
        SocialPlatform::Snapchat,
        SocialPlatform::Reddit,
        SocialPlatform::Telegram,
        SocialPlatform::Whatsapp,
        SocialPlatform::Discord,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SocialPlatform::Facebook => "facebook",
            SocialPlatform::Twitter => "twitter",
            SocialPlatform::Linkedin => "linkedin",
            SocialPlatform::Instagram => "instagram",
            SocialPlatform::Youtube => "youtube",
            SocialPlatform::Tiktok => "tiktok",
            SocialPlatform::Pinterest => "pinterest",
            SocialPlatform::Snapchat => "snapchat",
            SocialPlatform::Reddit => "reddit",
            SocialPlatform::Telegram => "telegram",
            SocialPlatform::Whatsapp => "whatsapp",
            SocialPlatform::Discord => "discord",
        }
    }
}

/// One profile URL slot per platform. The first URL discovered for a
/// platform wins; later finds never overwrite it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiktok: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinterest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapchat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reddit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord: Option<String>,
}

impl SocialLinks {
    pub fn get(&self, platform: SocialPlatform) -> Option<&str> {
        self.slot_ref(platform).as_deref()
    }

    /// Stores `url` for `platform` unless a URL is already recorded.
    /// Returns true when the slot was filled by this call.
    pub fn fill_if_empty(&mut self, platform: SocialPlatform, url: String) -> bool {
        let slot = self.slot_mut(platform);
        if slot.is_none() {
            *slot = Some(url);
            true
        } else {
            false
        }
    }

    pub fn is_empty(&self) -> bool {
        SocialPlatform::ALL
            .iter()
            .all(|platform| self.get(*platform).is_none())
    }

    pub fn count(&self) -> usize {
        SocialPlatform::ALL
            .iter()
            .filter(|platform| self.get(**platform).is_some())
            .count()
    }

    fn slot_ref(&self, platform: SocialPlatform) -> &Option<String> {
        match platform {
            SocialPlatform::Facebook => &self.facebook,
            SocialPlatform::Twitter => &self.twitter,
            SocialPlatform::Linkedin => &self.linkedin,
            SocialPlatform::Instagram => &self.instagram,
            SocialPlatform::Youtube => &self.youtube,
            SocialPlatform::Tiktok => &self.tiktok,
            SocialPlatform::Pinterest => &self.pinterest,
            SocialPlatform::Snapchat => &self.snapchat,
            SocialPlatform::Reddit => &self.reddit,
            SocialPlatform::Telegram => &self.telegram,
            SocialPlatform::Whatsapp => &self.whatsapp,
            SocialPlatform::Discord => &self.discord,
        }
    }

    fn slot_mut(&mut self, platform: SocialPlatform) -> &mut Option<String> {
        match platform {
            SocialPlatform::Facebook => &mut self.facebook,
            SocialPlatform::Twitter => &mut self.twitter,
            SocialPlatform::Linkedin => &mut self.linkedin,
            SocialPlatform::Instagram => &mut self.instagram,
            SocialPlatform::Youtube => &mut self.youtube,
            SocialPlatform::Tiktok => &mut self.tiktok,
            SocialPlatform::Pinterest => &mut self.pinterest,
            SocialPlatform::Snapchat => &mut self.snapchat,
            SocialPlatform::Reddit => &mut self.reddit,
            SocialPlatform::Telegram => &mut self.telegram,
            SocialPlatform::Whatsapp => &mut self.whatsapp,
            SocialPlatform::Discord => &mut self.discord,
        }
    }
}

/// Everything extracted for one seed URL, plus error/skip bookkeeping.
/// Exactly one of these exists per submitted URL by the time a batch ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteResult {
    pub website: String,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub social_links: SocialLinks,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
    #[serde(default)]
    pub addresses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimization_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_critical_error: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_data: Option<Map<String, Value>>,
}

impl SiteResult {
    pub fn new(website: impl Into<String>) -> Self {
        Self {
            website: website.into(),
            emails: Vec::new(),
            social_links: SocialLinks::default(),
            phone_numbers: Vec::new(),
            addresses: Vec::new(),
            optimization_note: None,
            error: None,
            is_critical_error: None,
            skipped: None,
            original_data: None,
        }
    }

    /// Result for a URL whose homepage fetch failed.
    pub fn from_failure(website: impl Into<String>, error: impl Into<String>, critical: bool) -> Self {
        let mut result = Self::new(website);
        result.error = Some(error.into());
        result.is_critical_error = Some(critical);
        result
    }

    /// Result for a URL that was never attempted because the batch broke.
    pub fn from_skip(website: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut result = Self::new(website);
        result.skipped = Some(true);
        result.error = Some(reason.into());
        result
    }

    /// Appends emails that are not already present, keeping prior order.
    pub fn merge_emails(&mut self, emails: impl IntoIterator<Item = String>) {
        for email in emails {
            if !self.emails.contains(&email) {
                self.emails.push(email);
            }
        }
    }

    /// Fills social slots from `links`, never replacing an earlier find.
    pub fn merge_social_links(&mut self, links: &SocialLinks) {
        for platform in SocialPlatform::ALL {
            if let Some(url) = links.get(platform) {
                self.social_links.fill_if_empty(platform, url.to_string());
            }
        }
    }

    pub fn merge_phone_numbers(&mut self, phones: impl IntoIterator<Item = String>) {
        for phone in phones {
            if !self.phone_numbers.contains(&phone) {
                self.phone_numbers.push(phone);
            }
        }
    }

    pub fn merge_addresses(&mut self, addresses: impl IntoIterator<Item = String>) {
        for address in addresses {
            if !self.addresses.contains(&address) {
                self.addresses.push(address);
            }
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.unwrap_or(false)
    }

    pub fn is_failed(&self) -> bool {
        self.is_critical_error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_emails_keeps_existing_and_appends_new() {
        let mut result = SiteResult::new("https://acme.com");
        result.merge_emails(vec!["info@acme.com".to_string()]);
        result.merge_emails(vec!["info@acme.com".to_string(), "sales@acme.com".to_string()]);
        assert_eq!(result.emails, vec!["info@acme.com", "sales@acme.com"]);
    }

    #[test]
    fn merge_social_links_never_overwrites() {
        let mut result = SiteResult::new("https://acme.com");
        let mut first = SocialLinks::default();
        first.fill_if_empty(
            SocialPlatform::Facebook,
            "https://facebook.com/acme".to_string(),
        );
        result.merge_social_links(&first);

        let mut second = SocialLinks::default();
        second.fill_if_empty(
            SocialPlatform::Facebook,
            "https://facebook.com/other".to_string(),
        );
        second.fill_if_empty(
            SocialPlatform::Twitter,
            "https://twitter.com/acme".to_string(),
        );
        result.merge_social_links(&second);

        assert_eq!(
            result.social_links.get(SocialPlatform::Facebook),
            Some("https://facebook.com/acme")
        );
        assert_eq!(
            result.social_links.get(SocialPlatform::Twitter),
            Some("https://twitter.com/acme")
        );
    }

    #[test]
    fn options_validation_flags_out_of_range_fields() {
        let options = CrawlOptions {
            max_depth: 9,
            timeout_ms: 1_000,
            ..CrawlOptions::default()
        };
        let errors = options.validation_errors();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.field == "options.maxDepth"));
        assert!(errors.iter().any(|e| e.field == "options.timeoutMs"));
        assert!(CrawlOptions::default().validation_errors().is_empty());
    }

    #[test]
    fn default_options_match_documented_values() {
        let options = CrawlOptions::default();
        assert_eq!(options.max_depth, 1);
        assert_eq!(options.timeout_ms, 30_000);
        assert!(options.follow_redirects);
        assert!(!options.extract_phone_numbers);
        assert!(!options.extract_addresses);
        assert!(options.smart_crawling);
    }

    #[test]
    fn site_result_serializes_camel_case_and_drops_empty_optionals() {
        let result = SiteResult::new("https://acme.com");
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("socialLinks").is_some());
        assert!(json.get("phoneNumbers").is_some());
        assert!(json.get("error").is_none());
        assert!(json.get("optimizationNote").is_none());
        assert!(json.get("skipped").is_none());
    }
}
