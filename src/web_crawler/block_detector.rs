// src/web_crawler/block_detector.rs

/// Phrases that mark a fetched page as an anti-bot interstitial or a
/// region block rather than real content. All comparisons are done on the
/// lowercased body.
const BLOCK_MARKERS: [&str; 20] = [
    "you have been blocked",
    "access denied",
    "access to this page has been denied",
    "attention required",
    "checking your browser before accessing",
    "checking if the site connection is secure",
    "verify you are human",
    "verifying you are human",
    "please complete the security check",
    "security check to access",
    "ddos protection by",
    "just a moment...",
    "enable javascript and cookies to continue",
    "request blocked",
    "your ip has been blocked",
    "ip address has been blocked",
    "not available in your country",
    "not available in your region",
    "error 1020",
    "error code: 1020",
];

/// Words that turn a bare "cloudflare" mention into a block verdict. The
/// brand name alone is not enough; badges like "protected by cloudflare"
/// appear on perfectly reachable pages.
const CLOUDFLARE_CONTEXT: [&str; 5] = [
    "blocked",
    "access denied",
    "security check",
    "attention required",
    "checking your browser",
];

/// Advisory block detection. Returns a user-facing message naming the URL
/// when the page looks like a block screen, None otherwise. Callers treat
/// the verdict as advisory; a block on a secondary page never fails the
/// site.
pub fn detect_region_block(html: &str, url: &str) -> Option<String> {
    let body = html.to_lowercase();

    let mut blocked = BLOCK_MARKERS.iter().any(|marker| body.contains(marker));

    if !blocked && body.contains("cloudflare") {
        blocked = CLOUDFLARE_CONTEXT.iter().any(|context| body.contains(context));
    }

    if !blocked {
        // Cloudflare error shells carry stable markup even when the wording
        // of the block message varies.
        blocked = body.contains("cf-error-details")
            && body.contains("cf-wrapper cf-header cf-error-overview")
            && (body.contains("sorry, you have been blocked")
                || body.contains("you are unable to access"));
    }

    if blocked {
        Some(format!(
            "Access to {} appears to be blocked by an anti-bot or region restriction. Retrying from a different network or through a VPN may help.",
            url
        ))
    } else {
        None
    }
}
