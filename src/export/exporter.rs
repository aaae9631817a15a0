// src/export/exporter.rs
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::models::Result;
use crate::web_crawler::types::{SiteResult, SocialPlatform};

/// Paths of the artifacts persisted for one batch.
#[derive(Debug, Clone, Serialize)]
pub struct ExportFiles {
    pub json: String,
    pub csv: String,
}

/// Top-level shape of the JSON artifact.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonArtifact {
    pub timestamp: String,
    pub total_urls: usize,
    pub results: Vec<SiteResult>,
}

/// Writes one timestamped JSON file and one CSV file per finished batch.
pub struct ResultExporter {
    output_dir: PathBuf,
    pretty_json: bool,
}

impl ResultExporter {
    pub fn new(output_dir: impl Into<PathBuf>, pretty_json: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            pretty_json,
        }
    }

    pub async fn export_batch(&self, results: &[SiteResult]) -> Result<ExportFiles> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let stamp = Utc::now().format("%Y%m%d_%H%M%S");

        let artifact = JsonArtifact {
            timestamp: Utc::now().to_rfc3339(),
            total_urls: results.len(),
            results: results.to_vec(),
        };
        let json_data = if self.pretty_json {
            serde_json::to_string_pretty(&artifact)?
        } else {
            serde_json::to_string(&artifact)?
        };
        let json_path = self.output_dir.join(format!("results_{}.json", stamp));
        tokio::fs::write(&json_path, json_data).await?;

        let csv_path = self.output_dir.join(format!("results_{}.csv", stamp));
        tokio::fs::write(&csv_path, render_csv(results)).await?;

        info!(
            "💾 Exported {} result(s) to {} and {}",
            results.len(),
            json_path.display(),
            csv_path.display()
        );

        Ok(ExportFiles {
            json: json_path.display().to_string(),
            csv: csv_path.display().to_string(),
        })
    }
}

/// CSV layout: echoed original-row columns first (prefixed original_), then
/// the fixed extraction columns. Every field is quoted.
pub fn render_csv(results: &[SiteResult]) -> String {
    let original_columns = collect_original_columns(results);

    let mut header: Vec<String> = original_columns
        .iter()
        .map(|column| format!("original_{}", column))
        .collect();
    header.push("website".to_string());
    header.push("emails".to_string());
    for platform in SocialPlatform::ALL {
        header.push(platform.as_str().to_string());
    }
    header.push("phoneNumbers".to_string());
    header.push("addresses".to_string());
    header.push("optimizationNote".to_string());
    header.push("isCriticalError".to_string());
    header.push("skipped".to_string());
    header.push("error".to_string());

    let mut csv = String::new();
    csv.push_str(&join_row(&header));
    csv.push('\n');

    for result in results {
        let mut row: Vec<String> = Vec::with_capacity(header.len());
        for column in &original_columns {
            let cell = result
                .original_data
                .as_ref()
                .and_then(|data| data.get(column))
                .map(value_to_cell)
                .unwrap_or_default();
            row.push(cell);
        }
        row.push(result.website.clone());
        row.push(result.emails.join("; "));
        for platform in SocialPlatform::ALL {
            row.push(result.social_links.get(platform).unwrap_or("").to_string());
        }
        row.push(result.phone_numbers.join("; "));
        row.push(result.addresses.join("; "));
        row.push(result.optimization_note.clone().unwrap_or_default());
        row.push(yes_no(result.is_critical_error));
        row.push(yes_no(result.skipped));
        row.push(result.error.clone().unwrap_or_default());

        csv.push_str(&join_row(&row));
        csv.push('\n');
    }

    csv
}

/// Union of original-row keys across all results in first-seen order. The
/// URL-bearing keys are excluded; the website column already covers them.
fn collect_original_columns(results: &[SiteResult]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for result in results {
        if let Some(data) = &result.original_data {
            for key in data.keys() {
                if key.eq_ignore_ascii_case("website") || key.eq_ignore_ascii_case("url") {
                    continue;
                }
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
    }
    columns
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn yes_no(flag: Option<bool>) -> String {
    if flag.unwrap_or(false) {
        "Yes".to_string()
    } else {
        "No".to_string()
    }
}

fn join_row(fields: &[String]) -> String {
    fields
        .iter()
        .map(|field| format!("\"{}\"", field.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web_crawler::types::SocialLinks;
    use serde_json::{json, Map};

    fn original_row(pairs: &[(&str, Value)]) -> Map<String, Value> {
        let mut map = Map::new();
        for (key, value) in pairs {
            map.insert(key.to_string(), value.clone());
        }
        map
    }

    #[test]
    fn csv_puts_original_columns_first_and_excludes_url_keys() {
        let mut first = SiteResult::new("https://a.com");
        first.original_data = Some(original_row(&[
            ("company", json!("Acme")),
            ("Website", json!("https://a.com")),
            ("city", json!("Geneva")),
        ]));
        let mut second = SiteResult::new("https://b.com");
        second.original_data = Some(original_row(&[
            ("company", json!("Borg")),
            ("phone", json!("123")),
        ]));

        let csv = render_csv(&[first, second]);
        let header = csv.lines().next().unwrap();
        assert!(header.starts_with("\"original_company\",\"original_city\",\"original_phone\",\"website\""));
        assert!(!header.contains("original_Website"));
        assert!(!header.contains("original_url"));

        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[1].starts_with("\"Acme\",\"Geneva\",\"\""));
        assert!(rows[2].starts_with("\"Borg\",\"\",\"123\""));
    }

    #[test]
    fn csv_joins_lists_and_prints_yes_no_flags() {
        let mut result = SiteResult::new("https://a.com");
        result.emails = vec!["a@a.com".to_string(), "b@a.com".to_string()];
        result.phone_numbers = vec!["+411234567890".to_string()];
        let mut links = SocialLinks::default();
        links.fill_if_empty(SocialPlatform::Facebook, "https://facebook.com/a".to_string());
        result.social_links = links;
        result.skipped = Some(true);
        result.error = Some("Stopped after 5 consecutive errors (limit 5)".to_string());

        let csv = render_csv(&[result]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("\"a@a.com; b@a.com\""));
        assert!(row.contains("\"https://facebook.com/a\""));
        assert!(row.contains("\"No\",\"Yes\""));
        assert!(row.contains("consecutive errors"));
    }

    #[test]
    fn csv_escapes_embedded_quotes() {
        let mut result = SiteResult::new("https://a.com");
        result.error = Some("said \"no\"".to_string());
        let csv = render_csv(&[result]);
        assert!(csv.contains("\"said \"\"no\"\"\""));
    }

    #[test]
    fn json_artifact_round_trips() {
        let mut result = SiteResult::new("https://a.com");
        result.emails = vec!["a@a.com".to_string()];
        let artifact = JsonArtifact {
            timestamp: Utc::now().to_rfc3339(),
            total_urls: 1,
            results: vec![result],
        };
        let text = serde_json::to_string_pretty(&artifact).unwrap();
        let parsed: JsonArtifact = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.total_urls, 1);
        assert_eq!(parsed.results[0].emails, vec!["a@a.com"]);
        assert!(text.contains("\"totalUrls\""));
    }
}
