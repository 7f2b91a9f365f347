//! Error taxonomy for the acquisition pipeline.
//!
//! Errors below the orchestrator never cross its boundary: search errors are
//! logged and cascaded, fetch and extraction errors are folded into an
//! error-flagged [`ArticleRecord`](crate::models::ArticleRecord). Only
//! [`ExportError`], [`ConfigError`] and [`QueryError`] reach the binary.

use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

/// Failure of a single discovery tier.
#[derive(Debug, Error)]
pub enum SearchProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),

    #[error("request was challenged by the provider: {0}")]
    Blocked(String),

    #[error("feed {url} could not be parsed: {reason}")]
    Feed { url: String, reason: String },
}

/// Terminal state of a direct download attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadState {
    Success,
    FailedResponse(String),
}

impl fmt::Display for DownloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadState::Success => write!(f, "SUCCESS"),
            DownloadState::FailedResponse(reason) => write!(f, "FAILED_RESPONSE ({reason})"),
        }
    }
}

/// Failure of a single fetch method.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("emulated request failed: {0}")]
    Emulated(#[from] wreq::Error),

    #[error("download failed with state {0}")]
    Download(DownloadState),

    #[error("HTTP status {0}")]
    Status(StatusCode),
}

/// Every fetch method in the chain failed for one URL.
#[derive(Debug, Error)]
#[error("All download methods failed. Original: {original}, Last ({last_method}): {last}")]
pub struct FetchFailed {
    pub original: String,
    pub last_method: &'static str,
    pub last: String,
    pub attempts: usize,
}

/// Failure while turning HTML into an article.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("document is empty")]
    EmptyDocument,

    #[error("no article content found in document")]
    NoContent,

    #[error("summarizer unavailable: {0}")]
    Summarizer(String),
}

/// Failure producing a report document.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No articles selected")]
    NothingToExport,

    #[error("article index {index} is out of range (1..={len})")]
    BadSelection { index: usize, len: usize },

    #[error("failed to write document: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failure loading the YAML configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// A search request that cannot be served.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("keyword is required")]
    EmptyKeyword,

    #[error("desired count must be between 1 and {max}, got {got}")]
    CountOutOfRange { got: usize, max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failed_mentions_both_reasons() {
        let err = FetchFailed {
            original: "download failed with state FAILED_RESPONSE (403)".to_string(),
            last_method: "impersonate",
            last: "HTTP status 503 Service Unavailable".to_string(),
            attempts: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("503"));
        assert!(msg.starts_with("All download methods failed"));
    }

    #[test]
    fn test_download_state_display() {
        assert_eq!(DownloadState::Success.to_string(), "SUCCESS");
        assert_eq!(
            DownloadState::FailedResponse("404".into()).to_string(),
            "FAILED_RESPONSE (404)"
        );
    }

    #[test]
    fn test_query_error_messages() {
        let e = QueryError::CountOutOfRange { got: 25, max: 20 };
        assert_eq!(e.to_string(), "desired count must be between 1 and 20, got 25");
        assert_eq!(QueryError::EmptyKeyword.to_string(), "keyword is required");
    }
}
