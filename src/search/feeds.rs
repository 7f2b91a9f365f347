//! Tertiary discovery tier: regional news RSS feeds.
//!
//! Feeds are read in priority order and entries whose title or summary
//! mention the keyword are collected until the requested count is reached.
//! When no entry anywhere mentions the keyword, the first feed that parsed
//! with at least one entry supplies its top headlines instead, so this tier
//! returns something whenever a single feed is reachable.

use super::SearchProvider;
use super::rss::{FeedEntry, parse_feed};
use crate::config::{DEFAULT_USER_AGENT, SearchConfig};
use crate::error::SearchProviderError;
use crate::models::{CandidateLink, SearchQuery};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use url::Url;

/// Loads and parses one feed.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn load(&self, url: &str) -> Result<Vec<FeedEntry>, SearchProviderError>;
}

/// Fetches feeds over HTTP.
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    pub fn new(config: &SearchConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn load(&self, url: &str) -> Result<Vec<FeedEntry>, SearchProviderError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchProviderError::Status(status));
        }
        let bytes = response.bytes().await?;
        parse_feed(&bytes).map_err(|reason| SearchProviderError::Feed {
            url: url.to_string(),
            reason,
        })
    }
}

pub struct FeedProvider {
    feeds: Vec<String>,
    source: Arc<dyn FeedSource>,
}

impl FeedProvider {
    pub fn new(feeds: Vec<String>, source: Arc<dyn FeedSource>) -> Self {
        Self { feeds, source }
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            config.feeds.clone(),
            Arc::new(HttpFeedSource::new(config)?),
        ))
    }
}

#[async_trait]
impl SearchProvider for FeedProvider {
    fn name(&self) -> &'static str {
        "rss"
    }

    #[instrument(level = "info", skip_all, fields(keyword = %query.keyword, feeds = self.feeds.len()))]
    async fn try_discover(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<CandidateLink>, SearchProviderError> {
        info!("Falling back to RSS feeds");
        let keyword = query.keyword.to_lowercase();
        let mut matches = Vec::new();
        // Entries of the first feed that parsed with content, kept for the
        // top-headlines fallback.
        let mut headlines: Option<Vec<FeedEntry>> = None;

        for feed_url in &self.feeds {
            let entries = match self.source.load(feed_url).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(feed = %feed_url, error = %e, "RSS feed unavailable");
                    continue;
                }
            };
            info!(feed = %feed_url, entries = entries.len(), "Parsed RSS feed");

            for entry in entries.iter().filter(|e| e.mentions(&keyword)) {
                if let Some(link) = to_link(entry) {
                    matches.push(link);
                }
                if matches.len() >= query.desired_count {
                    return Ok(matches);
                }
            }

            if headlines.is_none() && !entries.is_empty() {
                headlines = Some(entries);
            }
        }

        if !matches.is_empty() {
            return Ok(matches);
        }

        match headlines {
            Some(entries) => {
                warn!("No keyword matches in RSS feeds; returning top headlines");
                Ok(entries
                    .iter()
                    .filter_map(to_link)
                    .take(query.desired_count)
                    .collect())
            }
            None => Ok(Vec::new()),
        }
    }
}

fn to_link(entry: &FeedEntry) -> Option<CandidateLink> {
    let href = Url::parse(&entry.link).ok()?;
    Some(CandidateLink::new(
        href,
        Some(entry.title.clone()),
        Some(entry.summary.clone()),
    ))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory feeds keyed by URL. Missing URLs fail like a dead host.
    #[derive(Default)]
    pub struct StaticFeeds {
        pub feeds: HashMap<String, Vec<FeedEntry>>,
        pub requested: Mutex<Vec<String>>,
    }

    impl StaticFeeds {
        pub fn with(mut self, url: &str, entries: Vec<FeedEntry>) -> Self {
            self.feeds.insert(url.to_string(), entries);
            self
        }
    }

    #[async_trait]
    impl FeedSource for StaticFeeds {
        async fn load(&self, url: &str) -> Result<Vec<FeedEntry>, SearchProviderError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.feeds.get(url).cloned().ok_or_else(|| SearchProviderError::Feed {
                url: url.to_string(),
                reason: "unreachable".to_string(),
            })
        }
    }

    pub fn entry(title: &str, link: &str, summary: &str) -> FeedEntry {
        FeedEntry {
            title: title.to_string(),
            link: link.to_string(),
            summary: summary.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{StaticFeeds, entry};
    use super::*;
    use crate::models::RecencyWindow;

    const A: &str = "https://feeds.test/a";
    const B: &str = "https://feeds.test/b";
    const C: &str = "https://feeds.test/c";

    fn provider(source: StaticFeeds) -> (FeedProvider, Arc<StaticFeeds>) {
        let source = Arc::new(source);
        let feeds = vec![A.to_string(), B.to_string(), C.to_string()];
        (FeedProvider::new(feeds, source.clone()), source)
    }

    fn query(keyword: &str, count: usize) -> SearchQuery {
        SearchQuery::new(keyword, count, RecencyWindow::Day).unwrap()
    }

    #[tokio::test]
    async fn test_matches_across_feeds_until_count() {
        let source = StaticFeeds::default()
            .with(A, vec![
                entry("Rice prices up", "https://a.ph/1", ""),
                entry("Inflation hits 3%", "https://a.ph/2", ""),
            ])
            .with(B, vec![entry("BSP on prices", "https://b.ph/1", "Says INFLATION manageable")])
            .with(C, vec![entry("Inflation outlook", "https://c.ph/1", "")]);
        let (provider, source) = provider(source);

        let links = provider.try_discover(&query("inflation", 2)).await.unwrap();

        let hrefs: Vec<&str> = links.iter().map(|l| l.href.as_str()).collect();
        assert_eq!(hrefs, vec!["https://a.ph/2", "https://b.ph/1"]);
        // Stopped before the third feed.
        assert_eq!(source.requested.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_feed_is_skipped() {
        let source = StaticFeeds::default()
            .with(B, vec![entry("Inflation in Mindanao", "https://b.ph/1", "")]);
        let (provider, _) = provider(source);

        let links = provider.try_discover(&query("Inflation", 5)).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].title.as_deref(), Some("Inflation in Mindanao"));
    }

    #[tokio::test]
    async fn test_top_headlines_when_nothing_matches() {
        let source = StaticFeeds::default()
            .with(A, vec![])
            .with(B, vec![
                entry("Typhoon update", "https://b.ph/1", ""),
                entry("Senate session", "https://b.ph/2", ""),
                entry("Basketball finals", "https://b.ph/3", ""),
            ])
            .with(C, vec![entry("Other", "https://c.ph/1", "")]);
        let (provider, _) = provider(source);

        let links = provider.try_discover(&query("cryptocurrency", 2)).await.unwrap();

        let hrefs: Vec<&str> = links.iter().map(|l| l.href.as_str()).collect();
        assert_eq!(hrefs, vec!["https://b.ph/1", "https://b.ph/2"]);
    }

    #[tokio::test]
    async fn test_all_feeds_down_is_empty() {
        let (provider, _) = provider(StaticFeeds::default());
        assert!(provider.try_discover(&query("Inflation", 3)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_entries_without_valid_link_are_dropped() {
        let source = StaticFeeds::default()
            .with(A, vec![
                entry("Inflation note", "", ""),
                entry("Inflation story", "https://a.ph/ok", ""),
            ]);
        let (provider, _) = provider(source);

        let links = provider.try_discover(&query("inflation", 5)).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href.as_str(), "https://a.ph/ok");
    }
}
