//! Data models for search requests, discovered links and extracted articles.
//!
//! This module defines the value objects that flow through the pipeline:
//! - [`SearchQuery`]: One acquisition request (keyword, count, recency)
//! - [`CandidateLink`]: A discovered URL, not yet fetched
//! - [`ArticleRecord`]: The normalized output unit, successful or error-flagged
//! - [`SearchReport`]: A whole run, serialized to JSON and Markdown
//!
//! All of them are request-scoped; nothing here is persisted between runs.

use crate::error::QueryError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use url::Url;

/// Title used for error-flagged records when the search result had none.
pub const ERROR_PLACEHOLDER_TITLE: &str = "Error processing article";

/// Title used for successful extractions when neither the page nor the
/// search result provided one.
pub const UNTITLED_PLACEHOLDER: &str = "Untitled article";

/// Freshness bucket requested by the caller.
///
/// Providers map this onto whatever buckets they support.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RecencyWindow {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl RecencyWindow {
    /// Single-letter bucket code used by DuckDuckGo's `df` parameter.
    pub fn ddg_code(self) -> &'static str {
        match self {
            RecencyWindow::Day => "d",
            RecencyWindow::Week => "w",
            RecencyWindow::Month => "m",
            RecencyWindow::Year => "y",
        }
    }

    /// Google's `tbs` value for the same bucket.
    pub fn google_tbs(self) -> &'static str {
        match self {
            RecencyWindow::Day => "qdr:d",
            RecencyWindow::Week => "qdr:w",
            RecencyWindow::Month => "qdr:m",
            RecencyWindow::Year => "qdr:y",
        }
    }
}

/// A single acquisition request. Read-only once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    pub keyword: String,
    pub desired_count: usize,
    pub recency: RecencyWindow,
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

impl SearchQuery {
    /// Largest number of articles a caller may request.
    pub const MAX_COUNT: usize = 20;

    /// Build a validated query.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] when the keyword is blank or the count falls
    /// outside `1..=MAX_COUNT`.
    pub fn new(
        keyword: impl Into<String>,
        desired_count: usize,
        recency: RecencyWindow,
    ) -> Result<Self, QueryError> {
        let keyword = keyword.into().trim().to_string();
        if keyword.is_empty() {
            return Err(QueryError::EmptyKeyword);
        }
        if desired_count == 0 || desired_count > Self::MAX_COUNT {
            return Err(QueryError::CountOutOfRange {
                got: desired_count,
                max: Self::MAX_COUNT,
            });
        }
        Ok(Self {
            keyword,
            desired_count,
            recency,
            since: None,
            until: None,
        })
    }

    /// Attach a custom date range.
    ///
    /// Search engines only accept coarse buckets, so any explicit range
    /// widens the effective recency to a month.
    pub fn with_date_range(mut self, since: Option<NaiveDate>, until: Option<NaiveDate>) -> Self {
        self.since = since;
        self.until = until;
        self
    }

    /// The bucket actually sent to providers.
    pub fn effective_recency(&self) -> RecencyWindow {
        if self.since.is_some() || self.until.is_some() {
            RecencyWindow::Month
        } else {
            self.recency
        }
    }

    /// Region-scoped query text, e.g. `"Inflation news Philippines"`.
    pub fn regional_text(&self, region_label: &str) -> String {
        format!("{} news {}", self.keyword, region_label)
    }
}

/// A discovered link plus whatever metadata the provider offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateLink {
    pub href: Url,
    pub title: Option<String>,
    pub snippet: Option<String>,
}

impl CandidateLink {
    /// Build a link, dropping blank titles and snippets.
    pub fn new(href: Url, title: Option<String>, snippet: Option<String>) -> Self {
        Self {
            href,
            title: non_blank(title),
            snippet: non_blank(snippet),
        }
    }

    /// A link with no metadata, as returned by URL-only search results.
    pub fn bare(href: Url) -> Self {
        Self {
            href,
            title: None,
            snippet: None,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// A normalized article, the unit of pipeline output.
///
/// Exactly one of two shapes:
/// - **extracted**: `error` is `None`, `title` and `summary` are non-empty
/// - **error-flagged**: `error` is `Some`, `summary` explains the failure,
///   `authors` is empty and `body`/`hero_image` are empty/absent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub authors: Vec<String>,
    pub publish_date: Option<DateTime<Utc>>,
    pub summary: String,
    pub body: String,
    pub hero_image: Option<Url>,
    pub source_url: Url,
    pub error: Option<String>,
}

impl ArticleRecord {
    /// Build an error-flagged record for a link that could not be processed.
    pub fn failed(source_url: Url, initial_title: Option<&str>, error: &impl Display) -> Self {
        let reason = error.to_string();
        let title = initial_title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(ERROR_PLACEHOLDER_TITLE)
            .to_string();
        Self {
            title,
            authors: Vec::new(),
            publish_date: None,
            summary: format!("Could not extract content. Error: {reason}"),
            body: String::new(),
            hero_image: None,
            source_url,
            error: Some(reason),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Authors joined for display, or `"Unknown"`.
    pub fn byline(&self) -> String {
        if self.authors.is_empty() {
            "Unknown".to_string()
        } else {
            self.authors.join(", ")
        }
    }

    /// Extract the domain name (before the TLD) from the source URL.
    /// For example: "https://newsinfo.inquirer.net/123" -> "inquirer"
    pub fn source_tag(&self) -> Option<String> {
        let host = self.source_url.host_str()?;
        let parts: Vec<&str> = host.split('.').collect();
        if parts.len() >= 2 {
            Some(parts[parts.len() - 2].to_string())
        } else {
            None
        }
    }
}

/// Advisory attached to an acquisition that produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    NoCandidates,
}

impl Advisory {
    pub fn message(self) -> &'static str {
        match self {
            Advisory::NoCandidates => "No recent articles found. Try a broader keyword.",
        }
    }
}

/// One complete run: what was asked for and what came back.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchReport {
    pub keyword: String,
    pub recency: RecencyWindow,
    pub generated_at: DateTime<Utc>,
    pub advisory: Option<Advisory>,
    pub articles: Vec<ArticleRecord>,
}

impl SearchReport {
    pub fn succeeded(&self) -> usize {
        self.articles.iter().filter(|a| !a.is_error()).count()
    }

    pub fn failed(&self) -> usize {
        self.articles.len() - self.succeeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_query_validation() {
        assert!(SearchQuery::new("Inflation", 5, RecencyWindow::Day).is_ok());
        assert_eq!(
            SearchQuery::new("   ", 5, RecencyWindow::Day),
            Err(QueryError::EmptyKeyword)
        );
        assert_eq!(
            SearchQuery::new("Inflation", 0, RecencyWindow::Day),
            Err(QueryError::CountOutOfRange { got: 0, max: 20 })
        );
        assert!(SearchQuery::new("Inflation", 21, RecencyWindow::Day).is_err());
        assert!(SearchQuery::new("Inflation", 20, RecencyWindow::Day).is_ok());
    }

    #[test]
    fn test_query_trims_keyword() {
        let q = SearchQuery::new("  Traffic ", 3, RecencyWindow::Week).unwrap();
        assert_eq!(q.keyword, "Traffic");
        assert_eq!(q.regional_text("Philippines"), "Traffic news Philippines");
    }

    #[test]
    fn test_custom_range_widens_to_month() {
        let q = SearchQuery::new("Marcos", 3, RecencyWindow::Day).unwrap();
        assert_eq!(q.effective_recency(), RecencyWindow::Day);
        let q = q.with_date_range(NaiveDate::from_ymd_opt(2025, 1, 1), None);
        assert_eq!(q.effective_recency(), RecencyWindow::Month);
    }

    #[test]
    fn test_recency_codes() {
        assert_eq!(RecencyWindow::Day.ddg_code(), "d");
        assert_eq!(RecencyWindow::Year.ddg_code(), "y");
        assert_eq!(RecencyWindow::Week.google_tbs(), "qdr:w");
    }

    #[test]
    fn test_candidate_drops_blank_metadata() {
        let link = CandidateLink::new(
            url("https://example.com/a"),
            Some("  ".into()),
            Some(" snippet ".into()),
        );
        assert_eq!(link.title, None);
        assert_eq!(link.snippet.as_deref(), Some("snippet"));
    }

    #[test]
    fn test_failed_record_shape() {
        let record = ArticleRecord::failed(url("https://example.com/a"), Some("Known title"), &"boom");
        assert_eq!(record.title, "Known title");
        assert_eq!(record.error.as_deref(), Some("boom"));
        assert_eq!(record.summary, "Could not extract content. Error: boom");
        assert!(record.authors.is_empty());
        assert!(record.hero_image.is_none());
        assert!(record.body.is_empty());
    }

    #[test]
    fn test_failed_record_placeholder_title() {
        let record = ArticleRecord::failed(url("https://example.com/a"), None, &"boom");
        assert_eq!(record.title, ERROR_PLACEHOLDER_TITLE);
        let record = ArticleRecord::failed(url("https://example.com/a"), Some(""), &"boom");
        assert_eq!(record.title, ERROR_PLACEHOLDER_TITLE);
    }

    #[test]
    fn test_source_tag() {
        let record = ArticleRecord::failed(url("https://newsinfo.inquirer.net/1/x"), None, &"e");
        assert_eq!(record.source_tag(), Some("inquirer".to_string()));
        let record = ArticleRecord::failed(url("http://localhost/x"), None, &"e");
        assert_eq!(record.source_tag(), None);
    }

    #[test]
    fn test_report_serialization() {
        let report = SearchReport {
            keyword: "Inflation".into(),
            recency: RecencyWindow::Day,
            generated_at: Utc::now(),
            advisory: Some(Advisory::NoCandidates),
            articles: vec![],
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"no_candidates\""));
        assert!(json.contains("\"day\""));
        let back: SearchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.keyword, "Inflation");
        assert_eq!(back.succeeded(), 0);
    }
}
