// src/web_crawler/contact_extractor.rs
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

use crate::web_crawler::types::{SocialLinks, SocialPlatform};

/// Shape check applied to every candidate email after normalization.
pub(crate) const EMAIL_SHAPE_PATTERN: &str = r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$";

/// Keywords that mark a link as contact-like, matched against both the
/// href and the anchor text.
const CONTACT_KEYWORDS: [&str; 7] = [
    "contact",
    "about",
    "support",
    "help",
    "customer",
    "get in touch",
    "kontakt",
];

/// Upper bound on contact-like links collected from one page.
pub const MAX_CONTACT_LINKS: usize = 5;

/// Obfuscation tokens rewritten during email normalization. Applied after
/// lowercasing and whitespace removal, so spaced variants like "[ at ]"
/// collapse into these forms first.
const OBFUSCATION_TOKENS: [(&str, &str); 12] = [
    ("[at]", "@"),
    ("(at)", "@"),
    ("{at}", "@"),
    ("[@]", "@"),
    ("(@)", "@"),
    ("{@}", "@"),
    ("[dot]", "."),
    ("(dot)", "."),
    ("{dot}", "."),
    ("[.]", "."),
    ("(.)", "."),
    ("{.}", "."),
];

/// Href substrings recognized in the anchor fallback pass. Only a subset of
/// platforms is worth scanning here; the text pass already covers the rest.
const HREF_PLATFORMS: [(SocialPlatform, &[&str]); 6] = [
    (SocialPlatform::Facebook, &["facebook.com/"]),
    (
        SocialPlatform::Twitter,
        &["twitter.com/", "://x.com/", "www.x.com/"],
    ),
    (SocialPlatform::Linkedin, &["linkedin.com/"]),
    (SocialPlatform::Instagram, &["instagram.com/"]),
    (SocialPlatform::Youtube, &["youtube.com/", "youtu.be/"]),
    (SocialPlatform::Tiktok, &["tiktok.com/"]),
];

/// Extracts emails, social profile URLs, phone numbers, postal addresses
/// and contact-like links from page text and markup. Pure with respect to
/// its inputs; all network handling lives in the crawler.
pub struct ContactExtractor {
    email_patterns: Vec<Regex>,
    email_shape: Regex,
    social_patterns: Vec<(SocialPlatform, Regex)>,
    phone_regex: Regex,
    address_regex: Regex,
}

impl ContactExtractor {
    pub fn new() -> Self {
        let email_patterns = vec![
            // Plain addresses.
            Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap(),
            // Worded obfuscation: john [at] example [dot] com.
            Regex::new(
                r"(?i)[A-Za-z0-9._%+-]+\s*(?:\[at\]|\(at\)|\{at\})\s*[A-Za-z0-9.-]+(?:\s*(?:\[dot\]|\(dot\)|\{dot\})\s*[A-Za-z0-9-]+)*",
            )
            .unwrap(),
            // Spaced-out @: john @ example.com.
            Regex::new(r"[A-Za-z0-9._%+-]+\s*@\s*[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap(),
            // Bracketed symbols: john[@]example[.]com, john@example[.]com.
            Regex::new(
                r"[A-Za-z0-9._%+-]+\s*(?:@|[\[({]\s*@\s*[\])}])\s*[A-Za-z0-9-]+(?:\s*(?:\.|[\[({]\s*\.\s*[\])}])\s*[A-Za-z0-9-]+)+",
            )
            .unwrap(),
        ];

        let social_patterns = vec![
            (
                SocialPlatform::Facebook,
                Regex::new(r"(?i)(?:https?://)?(?:www\.|m\.)?facebook\.com/[A-Za-z0-9_./\-]+").unwrap(),
            ),
            (
                SocialPlatform::Twitter,
                Regex::new(r"(?i)(?:https?://)?(?:www\.)?(?:twitter\.com|x\.com)/[A-Za-z0-9_]+").unwrap(),
            ),
            (
                SocialPlatform::Linkedin,
                Regex::new(r"(?i)(?:https?://)?(?:www\.)?linkedin\.com/(?:in|company|school)/[A-Za-z0-9\-_%]+")
                    .unwrap(),
            ),
            (
                SocialPlatform::Instagram,
                Regex::new(r"(?i)(?:https?://)?(?:www\.)?instagram\.com/[A-Za-z0-9_.]+").unwrap(),
            ),
            (
                SocialPlatform::Youtube,
                Regex::new(
                    r"(?i)(?:https?://)?(?:www\.)?(?:youtube\.com/(?:channel/|c/|user/|@)[A-Za-z0-9_\-.]+|youtu\.be/[A-Za-z0-9_\-]+)",
                )
                .unwrap(),
            ),
            (
                SocialPlatform::Tiktok,
                Regex::new(r"(?i)(?:https?://)?(?:www\.)?tiktok\.com/@[A-Za-z0-9_.]+").unwrap(),
            ),
            (
                SocialPlatform::Pinterest,
                Regex::new(r"(?i)(?:https?://)?(?:[a-z]{2}\.|www\.)?pinterest\.com/[A-Za-z0-9_]+").unwrap(),
            ),
            (
                SocialPlatform::Snapchat,
                Regex::new(r"(?i)(?:https?://)?(?:www\.)?snapchat\.com/add/[A-Za-z0-9_.\-]+").unwrap(),
            ),
            (
                SocialPlatform::Reddit,
                Regex::new(r"(?i)(?:https?://)?(?:www\.)?reddit\.com/(?:r|u|user)/[A-Za-z0-9_\-]+").unwrap(),
            ),
            (
                SocialPlatform::Telegram,
                Regex::new(r"(?i)(?:https?://)?(?:t\.me|telegram\.me)/[A-Za-z0-9_]+").unwrap(),
            ),
            (
                SocialPlatform::Whatsapp,
                Regex::new(
                    r"(?i)(?:https?://)?(?:wa\.me/\+?[0-9]+|(?:api\.|chat\.)?whatsapp\.com/(?:send\?phone=\+?[0-9]+|[A-Za-z0-9]+))",
                )
                .unwrap(),
            ),
            (
                SocialPlatform::Discord,
                Regex::new(r"(?i)(?:https?://)?(?:www\.)?discord\.(?:gg|com/invite)/[A-Za-z0-9\-]+").unwrap(),
            ),
        ];

        Self {
            email_patterns,
            email_shape: Regex::new(EMAIL_SHAPE_PATTERN).unwrap(),
            social_patterns,
            phone_regex: Regex::new(
                r"(?:\+?1[-.\s]?)?\(?([0-9]{3})\)?[-.\s]?([0-9]{3})[-.\s]?([0-9]{4})(?:\s?(?:ext|x|extension)\.?\s?(\d+))?",
            )
            .unwrap(),
            address_regex: Regex::new(
                r"(?i)\b\d{1,5}\s+(?:[A-Za-z0-9'.-]+\s+){0,4}(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Drive|Dr|Lane|Ln|Way|Court|Ct|Place|Pl)\b\.?(?:[,\s]+(?:Suite|Ste|Unit|Apt|#)\.?\s*[0-9A-Za-z-]+)?",
            )
            .unwrap(),
        }
    }

    /// Runs every email pattern over the visible text. Matches are
    /// normalized, validated, lowercased and deduplicated, preserving the
    /// order of first discovery.
    pub fn extract_emails(&self, text: &str) -> Vec<String> {
        let mut emails = Vec::new();
        let mut seen = HashSet::new();
        for pattern in &self.email_patterns {
            for m in pattern.find_iter(text) {
                let normalized = normalize_obfuscated_email(m.as_str());
                if self.is_valid_email(&normalized) && seen.insert(normalized.clone()) {
                    emails.push(normalized);
                }
            }
        }
        emails
    }

    /// Pulls addresses out of mailto: anchors, dropping any query suffix
    /// (subject, body) before validation.
    pub fn extract_emails_from_html(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let selector = Selector::parse("a[href]").unwrap();
        let mut emails = Vec::new();
        let mut seen = HashSet::new();
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                let href = href.trim();
                let scheme_is_mailto = href
                    .get(..7)
                    .map(|prefix| prefix.eq_ignore_ascii_case("mailto:"))
                    .unwrap_or(false);
                if let (true, Some(rest)) = (scheme_is_mailto, href.get(7..)) {
                    let address = rest.split('?').next().unwrap_or("").trim().to_lowercase();
                    if self.is_valid_email(&address) && seen.insert(address.clone()) {
                        emails.push(address);
                    }
                }
            }
        }
        emails
    }

    /// Two-pass social discovery: visible text first, then anchor hrefs for
    /// the platforms still empty. The first URL per platform wins.
    pub fn extract_social_links(&self, text: &str, html: &str) -> SocialLinks {
        let mut links = SocialLinks::default();

        for (platform, pattern) in &self.social_patterns {
            if links.get(*platform).is_none() {
                if let Some(m) = pattern.find(text) {
                    links.fill_if_empty(*platform, ensure_scheme(m.as_str()));
                }
            }
        }

        let document = Html::parse_document(html);
        let selector = Selector::parse("a[href]").unwrap();
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                let href = href.trim();
                let href_lower = href.to_lowercase();
                for (platform, needles) in HREF_PLATFORMS {
                    if links.get(platform).is_none()
                        && needles.iter().any(|needle| href_lower.contains(needle))
                    {
                        links.fill_if_empty(platform, ensure_scheme(href));
                    }
                }
            }
        }

        links
    }

    /// North-American style phone numbers, normalized to digits with an
    /// optional leading +.
    pub fn extract_phone_numbers(&self, text: &str) -> Vec<String> {
        let mut phones = Vec::new();
        let mut seen = HashSet::new();
        for m in self.phone_regex.find_iter(text) {
            let normalized: String = m
                .as_str()
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '+')
                .collect();
            if normalized.len() >= 10 && seen.insert(normalized.clone()) {
                phones.push(normalized);
            }
        }
        phones
    }

    /// Street-address shaped fragments: number, street name, a common
    /// street suffix, optionally a unit.
    pub fn extract_addresses(&self, text: &str) -> Vec<String> {
        let mut addresses = Vec::new();
        let mut seen = HashSet::new();
        for m in self.address_regex.find_iter(text) {
            let address = m.as_str().trim().to_string();
            if seen.insert(address.clone()) {
                addresses.push(address);
            }
        }
        addresses
    }

    /// Links worth following for contact details, resolved against
    /// `base_url`, deduplicated, capped at MAX_CONTACT_LINKS. Fragment-only,
    /// javascript:, mailto: and tel: hrefs are never candidates.
    pub fn find_contact_like_links(&self, html: &str, base_url: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let selector = Selector::parse("a[href]").unwrap();
        let mut links = Vec::new();

        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                let href = href.trim();
                if href.is_empty() || href.starts_with('#') {
                    continue;
                }
                let href_lower = href.to_lowercase();
                if href_lower.starts_with("javascript:")
                    || href_lower.starts_with("mailto:")
                    || href_lower.starts_with("tel:")
                {
                    continue;
                }
                let anchor_text = element.text().collect::<String>().to_lowercase();
                let is_contact_like = CONTACT_KEYWORDS
                    .iter()
                    .any(|keyword| href_lower.contains(keyword) || anchor_text.contains(keyword));
                if !is_contact_like {
                    continue;
                }
                if let Some(resolved) = resolve_url(href, base_url) {
                    if !links.contains(&resolved) {
                        links.push(resolved);
                        if links.len() == MAX_CONTACT_LINKS {
                            break;
                        }
                    }
                }
            }
        }

        links
    }

    pub fn is_valid_email(&self, email: &str) -> bool {
        !email.contains("..") && self.email_shape.is_match(email)
    }
}

impl Default for ContactExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Standalone shape check for callers that do not hold an extractor.
pub fn is_valid_email_address(email: &str) -> bool {
    if email.contains("..") {
        return false;
    }
    Regex::new(EMAIL_SHAPE_PATTERN)
        .map(|shape| shape.is_match(email))
        .unwrap_or(false)
}

fn normalize_obfuscated_email(raw: &str) -> String {
    let mut email: String = raw.to_lowercase().split_whitespace().collect();
    for (token, replacement) in OBFUSCATION_TOKENS {
        if email.contains(token) {
            email = email.replace(token, replacement);
        }
    }
    email
}

/// Prefixes https:// onto schemeless URLs so stored links are navigable.
pub(crate) fn ensure_scheme(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else if let Some(rest) = url.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        format!("https://{}", url)
    }
}

fn resolve_url(href: &str, base_url: &str) -> Option<String> {
    match Url::parse(href) {
        Ok(url) => Some(url.to_string()),
        Err(_) => Url::parse(base_url)
            .ok()?
            .join(href)
            .ok()
            .map(|joined| joined.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_and_obfuscated_emails() {
        let extractor = ContactExtractor::new();
        let text = "Reach us at Info@Acme.com, john [at] acme [dot] com, \
                    sales @ acme.com or jane[@]acme[.]com";
        let emails = extractor.extract_emails(text);
        assert_eq!(
            emails,
            vec![
                "info@acme.com",
                "john@acme.com",
                "sales@acme.com",
                "jane@acme.com"
            ]
        );
    }

    #[test]
    fn deduplicates_across_patterns_and_lowercases() {
        let extractor = ContactExtractor::new();
        let emails = extractor.extract_emails("INFO@acme.com and info @ acme.com");
        assert_eq!(emails, vec!["info@acme.com"]);
    }

    #[test]
    fn rejects_invalid_shapes_after_normalization() {
        let extractor = ContactExtractor::new();
        assert!(extractor.extract_emails("john [at] acme").is_empty());
        assert!(!extractor.is_valid_email("a..b@acme.com"));
        assert!(extractor.is_valid_email("a.b@acme.com"));
    }

    #[test]
    fn mailto_anchors_drop_query_parameters() {
        let extractor = ContactExtractor::new();
        let html = r#"<html><body>
            <a href="mailto:Hello@Acme.com?subject=Hi&body=There">Email us</a>
            <a href="mailto:hello@acme.com">Email us again</a>
            <a href="MAILTO:other@acme.com">Other</a>
        </body></html>"#;
        let emails = extractor.extract_emails_from_html(html);
        assert_eq!(emails, vec!["hello@acme.com", "other@acme.com"]);
    }

    #[test]
    fn social_text_match_wins_over_anchor_href() {
        let extractor = ContactExtractor::new();
        let text = "Find us on facebook.com/acme-page today";
        let html = r#"<html><body>
            <a href="https://facebook.com/other-page">Facebook</a>
            <a href="https://tiktok.com/@acme">TikTok</a>
        </body></html>"#;
        let links = extractor.extract_social_links(text, html);
        assert_eq!(
            links.get(SocialPlatform::Facebook),
            Some("https://facebook.com/acme-page")
        );
        assert_eq!(
            links.get(SocialPlatform::Tiktok),
            Some("https://tiktok.com/@acme")
        );
    }

    #[test]
    fn recognizes_platform_urls_in_text() {
        let extractor = ContactExtractor::new();
        let text = "twitter.com/acme linkedin.com/company/acme instagram.com/acme \
                    youtube.com/@acme t.me/acme discord.gg/acme reddit.com/r/acme";
        let links = extractor.extract_social_links(text, "");
        assert_eq!(links.get(SocialPlatform::Twitter), Some("https://twitter.com/acme"));
        assert_eq!(
            links.get(SocialPlatform::Linkedin),
            Some("https://linkedin.com/company/acme")
        );
        assert_eq!(
            links.get(SocialPlatform::Instagram),
            Some("https://instagram.com/acme")
        );
        assert_eq!(links.get(SocialPlatform::Youtube), Some("https://youtube.com/@acme"));
        assert_eq!(links.get(SocialPlatform::Telegram), Some("https://t.me/acme"));
        assert_eq!(links.get(SocialPlatform::Discord), Some("https://discord.gg/acme"));
        assert_eq!(links.get(SocialPlatform::Reddit), Some("https://reddit.com/r/acme"));
    }

    #[test]
    fn contact_links_filter_cap_and_resolve() {
        let extractor = ContactExtractor::new();
        let html = r##"<html><body>
            <a href="/contact">Contact</a>
            <a href="/contact">Contact duplicate</a>
            <a href="#contact">Fragment</a>
            <a href="javascript:void(0)">Contact popup</a>
            <a href="mailto:x@acme.com">Contact email</a>
            <a href="tel:+15551234567">Call support</a>
            <a href="/about">About</a>
            <a href="/support">Support</a>
            <a href="/help">Help</a>
            <a href="/customer-service">Customer service</a>
            <a href="/kontakt">Kontakt</a>
            <a href="/pricing">Pricing</a>
        </body></html>"##;
        let links = extractor.find_contact_like_links(html, "https://acme.com");
        assert_eq!(links.len(), MAX_CONTACT_LINKS);
        assert_eq!(
            links,
            vec![
                "https://acme.com/contact",
                "https://acme.com/about",
                "https://acme.com/support",
                "https://acme.com/help",
                "https://acme.com/customer-service",
            ]
        );
    }

    #[test]
    fn contact_links_match_anchor_text_too() {
        let extractor = ContactExtractor::new();
        let html = r#"<a href="/reach-us">Get in touch</a>"#;
        let links = extractor.find_contact_like_links(html, "https://acme.com");
        assert_eq!(links, vec!["https://acme.com/reach-us"]);
    }

    #[test]
    fn phone_extraction_respects_flag_shapes() {
        let extractor = ContactExtractor::new();
        let phones = extractor.extract_phone_numbers("Call (555) 123-4567 or +1 555.987.6543");
        assert_eq!(phones, vec!["5551234567", "+15559876543"]);
    }

    #[test]
    fn address_extraction_finds_street_shapes() {
        let extractor = ContactExtractor::new();
        let addresses =
            extractor.extract_addresses("Visit 123 Main Street, Suite 400 or write to us.");
        assert_eq!(addresses.len(), 1);
        assert!(addresses[0].starts_with("123 Main Street"));
    }

    #[test]
    fn scheme_helper_handles_protocol_relative() {
        assert_eq!(ensure_scheme("facebook.com/acme"), "https://facebook.com/acme");
        assert_eq!(ensure_scheme("//facebook.com/acme"), "https://facebook.com/acme");
        assert_eq!(ensure_scheme("http://acme.com"), "http://acme.com");
    }
}
