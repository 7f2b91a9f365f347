//! Runtime configuration loaded from an optional YAML file.
//!
//! Every field has a default, so an absent file or a partial file is valid:
//!
//! ```yaml
//! search:
//!   retry_delay_secs: 2
//! pipeline:
//!   concurrency: 4
//! ```

use crate::error::ConfigError;
use crate::extract::summarize::DEFAULT_SENTENCES;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

/// Desktop browser user agent used by the direct and header-rich fetch methods.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

/// Regional feeds, in priority order.
pub const DEFAULT_FEEDS: [&str; 5] = [
    "https://www.inquirer.net/fullfeed",
    "https://www.philstar.com/rss",
    "https://www.rappler.com/feed",
    "https://data.gmanews.tv/gno/rss/news/nation.xml",
    "https://www.manilatimes.net/feed/",
];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub fetch: FetchConfig,
    pub pipeline: PipelineConfig,
    pub summary: SummaryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Appended to the keyword: `"{keyword} news {region_label}"`.
    pub region_label: String,
    /// DuckDuckGo `kl` region code.
    pub ddg_region: String,
    pub retry_attempts: usize,
    pub retry_delay_secs: u64,
    pub timeout_secs: u64,
    pub feeds: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            region_label: "Philippines".to_string(),
            ddg_region: "ph-ph".to_string(),
            retry_attempts: 3,
            retry_delay_secs: 5,
            timeout_secs: 10,
            feeds: DEFAULT_FEEDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl SearchConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    /// Referer sent by the header-rich fetch method.
    pub referer: String,
    pub timeout_secs: u64,
    pub impersonate_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: "https://www.google.com/".to_string(),
            timeout_secs: 10,
            impersonate_timeout_secs: 15,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn impersonate_timeout(&self) -> Duration {
        Duration::from_secs(self.impersonate_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Links processed at once. `1` processes them strictly one after another.
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub max_sentences: usize,
    /// Characters of body used when the summarizer produces nothing.
    pub excerpt_chars: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_sentences: DEFAULT_SENTENCES,
            excerpt_chars: 200,
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, or defaults when no path is given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, is not valid YAML,
    /// or holds values that would disable the pipeline.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
                let config = Self::from_yaml(&text)?;
                info!(path = %path.display(), "Loaded configuration");
                config
            }
            None => {
                info!("No config file given; using defaults");
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.retry_attempts == 0 {
            return Err(ConfigError::Invalid("search.retry_attempts must be at least 1".into()));
        }
        if self.pipeline.concurrency == 0 {
            return Err(ConfigError::Invalid("pipeline.concurrency must be at least 1".into()));
        }
        if self.summary.max_sentences == 0 {
            return Err(ConfigError::Invalid("summary.max_sentences must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.search.retry_attempts, 3);
        assert_eq!(config.search.retry_delay(), Duration::from_secs(5));
        assert_eq!(config.search.ddg_region, "ph-ph");
        assert_eq!(config.search.feeds.len(), 5);
        assert_eq!(config.search.feeds[0], "https://www.inquirer.net/fullfeed");
        assert_eq!(config.fetch.timeout(), Duration::from_secs(10));
        assert_eq!(config.fetch.impersonate_timeout(), Duration::from_secs(15));
        assert_eq!(config.pipeline.concurrency, 1);
        assert_eq!(config.summary.excerpt_chars, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml(
            "search:\n  retry_delay_secs: 1\npipeline:\n  concurrency: 4\n",
        )
        .unwrap();
        assert_eq!(config.search.retry_delay_secs, 1);
        assert_eq!(config.search.retry_attempts, 3);
        assert_eq!(config.pipeline.concurrency, 4);
        assert_eq!(config.fetch.referer, "https://www.google.com/");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = AppConfig::from_yaml("").unwrap();
        assert_eq!(config.summary.max_sentences, 5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = AppConfig::from_yaml("pipeline:\n  concurrency: 0\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bad_yaml() {
        assert!(matches!(
            AppConfig::from_yaml("search: [unclosed"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/philinews.yaml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
