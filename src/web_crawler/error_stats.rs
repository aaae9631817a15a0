// src/web_crawler/error_stats.rs
use serde::{Deserialize, Serialize};

/// Error substrings that describe an individual website misbehaving. These
/// are expected during any large batch and never count as critical. Checked
/// before the critical markers, so an ambiguous message stays non-critical.
const WEBSITE_ERROR_MARKERS: [&str; 19] = [
    "cloudflare",
    "blocked",
    "access denied",
    "rate limit",
    "too many requests",
    "forbidden",
    "not found",
    "bad gateway",
    "service unavailable",
    "gateway timeout",
    "timeout",
    "timed out",
    "403",
    "404",
    "429",
    "500",
    "502",
    "503",
    "504",
];

/// Error substrings that suggest the scraping infrastructure itself is
/// failing: dead sessions, connection-level faults, programming errors.
const SYSTEM_ERROR_MARKERS: [&str; 17] = [
    "browser has been closed",
    "session closed",
    "target closed",
    "protocol error",
    "connection refused",
    "connection reset",
    "connection closed before",
    "dns error",
    "failed to lookup",
    "name not resolved",
    "getaddrinfo",
    "econnreset",
    "enotfound",
    "econnrefused",
    "referenceerror",
    "typeerror",
    "syntaxerror",
];

/// Classifies an error message. Website-level markers win over system-level
/// ones; a message matching neither list is not critical.
pub fn is_critical_error(message: &str) -> bool {
    let message = message.to_lowercase();
    if WEBSITE_ERROR_MARKERS.iter().any(|marker| message.contains(marker)) {
        return false;
    }
    SYSTEM_ERROR_MARKERS.iter().any(|marker| message.contains(marker))
}

/// Consecutive successes after which accumulated critical errors are
/// forgiven. Scattered critical errors in an otherwise healthy batch should
/// not stop it.
const RECOVERY_SUCCESS_STREAK: u32 = 5;

/// Running error counters for one batch. Serialized into progress and the
/// final response as errorBreakInfo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorStats {
    pub consecutive_errors: u32,
    pub total_errors: u32,
    pub critical_errors: u32,
    pub success_count: u32,
    pub should_break: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub break_reason: Option<String>,
}

impl ErrorStats {
    pub fn record_success(&mut self) {
        self.consecutive_errors = 0;
        self.success_count += 1;
        if self.success_count >= RECOVERY_SUCCESS_STREAK {
            self.critical_errors = 0;
            self.success_count = 0;
        }
    }

    pub fn record_failure(&mut self, critical: bool) {
        self.consecutive_errors += 1;
        self.total_errors += 1;
        self.success_count = 0;
        if critical {
            self.critical_errors += 1;
        }
    }

    pub fn mark_break(&mut self, reason: &str) {
        self.should_break = true;
        self.break_reason = Some(reason.to_string());
    }
}

/// Batch abort thresholds. Loaded from config; the defaults suit batches of
/// a few dozen URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakPolicy {
    pub max_consecutive_errors: u32,
    pub max_total_errors: u32,
    pub max_error_rate: f64,
    pub min_urls_for_rate_check: usize,
    pub max_critical_errors: u32,
}

impl Default for BreakPolicy {
    fn default() -> Self {
        Self {
            max_consecutive_errors: 5,
            max_total_errors: 10,
            max_error_rate: 0.7,
            min_urls_for_rate_check: 5,
            max_critical_errors: 3,
        }
    }
}

impl BreakPolicy {
    /// Evaluates the break conditions in priority order and returns the
    /// first matching reason. `current_index` is the zero-based position of
    /// the URL about to be (or just) attempted.
    pub fn evaluate(&self, stats: &ErrorStats, current_index: usize) -> Option<String> {
        if stats.consecutive_errors >= self.max_consecutive_errors {
            return Some(format!(
                "Stopped after {} consecutive errors (limit {})",
                stats.consecutive_errors, self.max_consecutive_errors
            ));
        }
        if stats.total_errors >= self.max_total_errors {
            return Some(format!(
                "Stopped after {} total errors (limit {})",
                stats.total_errors, self.max_total_errors
            ));
        }
        let attempted = current_index + 1;
        if attempted >= self.min_urls_for_rate_check {
            let rate = stats.total_errors as f64 / attempted as f64;
            if rate >= self.max_error_rate {
                return Some(format!(
                    "Stopped at {:.0}% error rate (limit {:.0}%)",
                    rate * 100.0,
                    self.max_error_rate * 100.0
                ));
            }
        }
        if stats.critical_errors >= self.max_critical_errors {
            return Some(format!(
                "Stopped after {} critical errors (limit {})",
                stats.critical_errors, self.max_critical_errors
            ));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_errors_are_never_critical() {
        assert!(!is_critical_error("HTTP error: 403 Forbidden"));
        assert!(!is_critical_error("HTTP error: 503 Service Unavailable"));
        assert!(!is_critical_error("Request timeout after 30000ms"));
        assert!(!is_critical_error("Blocked by Cloudflare"));
    }

    #[test]
    fn infrastructure_errors_are_critical() {
        assert!(is_critical_error("tcp connect error: connection refused"));
        assert!(is_critical_error("dns error: failed to lookup address information"));
        assert!(is_critical_error("Protocol error (Page.navigate): Session closed"));
    }

    #[test]
    fn website_markers_win_over_system_markers() {
        // Carries both a timeout and a session marker; timeout wins.
        assert!(!is_critical_error("session closed waiting for timeout"));
    }

    #[test]
    fn unknown_errors_are_not_critical() {
        assert!(!is_critical_error("something unusual happened"));
    }

    #[test]
    fn consecutive_break_has_highest_priority() {
        let policy = BreakPolicy::default();
        let stats = ErrorStats {
            consecutive_errors: 5,
            total_errors: 10,
            critical_errors: 3,
            ..ErrorStats::default()
        };
        let reason = policy.evaluate(&stats, 9).unwrap();
        assert!(reason.contains("consecutive errors"));
    }

    #[test]
    fn total_break_beats_rate_and_critical() {
        let policy = BreakPolicy::default();
        let stats = ErrorStats {
            consecutive_errors: 1,
            total_errors: 10,
            critical_errors: 3,
            ..ErrorStats::default()
        };
        let reason = policy.evaluate(&stats, 10).unwrap();
        assert!(reason.contains("total errors"));
    }

    #[test]
    fn rate_break_needs_minimum_urls_attempted() {
        let policy = BreakPolicy::default();
        let stats = ErrorStats {
            consecutive_errors: 3,
            total_errors: 3,
            ..ErrorStats::default()
        };
        // Three failures out of three attempted is 100%, but only three
        // URLs have been attempted.
        assert!(policy.evaluate(&stats, 2).is_none());
        let stats = ErrorStats {
            consecutive_errors: 1,
            total_errors: 4,
            ..ErrorStats::default()
        };
        let reason = policy.evaluate(&stats, 4).unwrap();
        assert!(reason.contains("error rate"));
    }

    #[test]
    fn critical_break_fires_last() {
        let policy = BreakPolicy::default();
        let stats = ErrorStats {
            consecutive_errors: 1,
            total_errors: 3,
            critical_errors: 3,
            ..ErrorStats::default()
        };
        let reason = policy.evaluate(&stats, 19).unwrap();
        assert!(reason.contains("critical errors"));
    }

    #[test]
    fn five_successes_forgive_critical_errors() {
        let mut stats = ErrorStats::default();
        stats.record_failure(true);
        stats.record_failure(true);
        assert_eq!(stats.critical_errors, 2);
        for _ in 0..4 {
            stats.record_success();
        }
        assert_eq!(stats.critical_errors, 2);
        stats.record_success();
        assert_eq!(stats.critical_errors, 0);
        assert_eq!(stats.success_count, 0);
    }

    #[test]
    fn failure_resets_the_success_streak() {
        let mut stats = ErrorStats::default();
        stats.record_failure(true);
        for _ in 0..4 {
            stats.record_success();
        }
        stats.record_failure(false);
        for _ in 0..4 {
            stats.record_success();
        }
        // Nine successes overall, but never five in a row.
        assert_eq!(stats.critical_errors, 1);
    }

    #[test]
    fn serializes_camel_case() {
        let stats = ErrorStats {
            consecutive_errors: 2,
            ..ErrorStats::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["consecutiveErrors"], 2);
        assert!(json.get("breakReason").is_none());
        assert_eq!(json["shouldBreak"], false);
    }
}
