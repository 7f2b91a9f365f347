//! JSON output of a whole run.
//!
//! Reports are grouped by local date and named after the keyword and the
//! time they were generated:
//!
//! ```text
//! json_output_dir/
//! └── 2025-06-05/
//!     ├── inflation_081500.json
//!     └── sara-duterte_143012.json
//! ```

use crate::models::SearchReport;
use crate::utils::slugify_title;
use chrono::Local;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// `{date}/{slug}_{HHMMSS}` for `report`, without extension.
pub fn report_stem(report: &SearchReport) -> (String, String) {
    let local = report.generated_at.with_timezone(&Local);
    let slug = slugify_title(&report.keyword);
    let slug = if slug.is_empty() { "report".to_string() } else { slug };
    (
        local.format("%Y-%m-%d").to_string(),
        format!("{}_{}", slug, local.format("%H%M%S")),
    )
}

/// Write `report` as pretty JSON under `json_output_dir` and return the path.
///
/// # Errors
///
/// Returns an error if serialization, directory creation or the write fails.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_report(
    report: &SearchReport,
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;

    let (date, stem) = report_stem(report);
    let full_json_dir = PathBuf::from(json_output_dir).join(date);

    info!(full_json_dir = %full_json_dir.display(), "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(full_json_dir = %full_json_dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = full_json_dir.join(format!("{stem}.json"));
    fs::write(&path, json).await?;
    info!(path = %path.display(), articles = report.articles.len(), "Wrote JSON report");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArticleRecord, RecencyWindow};
    use chrono::{TimeZone, Utc};
    use url::Url;

    fn report() -> SearchReport {
        SearchReport {
            keyword: "Sara Duterte".into(),
            recency: RecencyWindow::Week,
            generated_at: Utc.with_ymd_and_hms(2025, 6, 5, 12, 0, 0).unwrap(),
            advisory: None,
            articles: vec![ArticleRecord::failed(
                Url::parse("https://a.ph/1").unwrap(),
                Some("Title"),
                &"timeout",
            )],
        }
    }

    #[test]
    fn test_report_stem() {
        let (date, stem) = report_stem(&report());
        assert_eq!(date.len(), 10);
        assert!(stem.starts_with("sara-duterte_"));
        assert_eq!(stem.len(), "sara-duterte_".len() + 6);
    }

    #[tokio::test]
    async fn test_write_report_round_trips() {
        let dir = std::env::temp_dir().join(format!("philinews-json-{}", std::process::id()));
        let path = write_report(&report(), &dir.to_string_lossy()).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let back: SearchReport = serde_json::from_str(&text).unwrap();
        assert_eq!(back.keyword, "Sara Duterte");
        assert_eq!(back.failed(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
