//! Keyword discovery across a cascade of search providers.
//!
//! Providers are tried in order and the first one that returns at least one
//! link wins:
//!
//! | Tier | Module | Source |
//! |------|--------|--------|
//! | 1 | [`duckduckgo`] | DuckDuckGo HTML search, region scoped, retried |
//! | 2 | [`google`] | Google web search, rich or URL-only results |
//! | 3 | [`feeds`] | Regional RSS feeds, keyword filtered |
//!
//! A provider error never leaves this module. It is logged, recorded as a
//! [`TierOutcome::Failed`], and the cascade moves on. When every tier comes up
//! empty, [`SearchChain::discover`] returns an empty [`Discovery`].

pub mod duckduckgo;
pub mod feeds;
pub mod google;
pub mod retry;
pub mod rss;

use crate::config::SearchConfig;
use crate::error::SearchProviderError;
use crate::models::{CandidateLink, SearchQuery};
use async_trait::async_trait;
use itertools::Itertools;
use std::fmt;
use tracing::{debug, info, instrument, warn};

use duckduckgo::DuckDuckGo;
use feeds::FeedProvider;
use google::Google;
use retry::Retry;

/// One discovery tier.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Look for links matching `query`. An empty vector is a valid answer.
    async fn try_discover(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<CandidateLink>, SearchProviderError>;
}

/// What a single tier produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierOutcome {
    Found(usize),
    Empty,
    Failed(String),
}

impl fmt::Display for TierOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierOutcome::Found(n) => write!(f, "found {n}"),
            TierOutcome::Empty => write!(f, "empty"),
            TierOutcome::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Record of one tier attempt.
#[derive(Debug, Clone)]
pub struct TierReport {
    pub provider: &'static str,
    pub outcome: TierOutcome,
}

/// Result of [`SearchChain::discover`].
#[derive(Debug, Default)]
pub struct Discovery {
    /// Deduplicated by `href`, at most `desired_count` long.
    pub links: Vec<CandidateLink>,
    /// The provider that supplied `links`, if any did.
    pub provider: Option<&'static str>,
    pub tiers: Vec<TierReport>,
}

impl Discovery {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Ordered list of providers.
pub struct SearchChain {
    providers: Vec<Box<dyn SearchProvider>>,
}

impl SearchChain {
    pub fn new(providers: Vec<Box<dyn SearchProvider>>) -> Self {
        Self { providers }
    }

    /// The standard three-tier chain: retried DuckDuckGo, Google, RSS feeds.
    pub fn from_config(config: &SearchConfig) -> Result<Self, reqwest::Error> {
        let primary = Retry::new(
            DuckDuckGo::new(config)?,
            config.retry_attempts,
            config.retry_delay(),
        );
        Ok(Self::new(vec![
            Box::new(primary),
            Box::new(Google::new(config)?),
            Box::new(FeedProvider::from_config(config)?),
        ]))
    }

    /// Run the cascade, stopping at the first tier with results.
    #[instrument(level = "info", skip_all, fields(keyword = %query.keyword, count = query.desired_count))]
    pub async fn discover(&self, query: &SearchQuery) -> Discovery {
        let mut discovery = Discovery::default();

        for provider in &self.providers {
            let name = provider.name();
            let outcome = match provider.try_discover(query).await {
                Ok(links) => {
                    let links = normalize(links, query.desired_count);
                    if links.is_empty() {
                        info!(provider = name, "Provider returned no results");
                        TierOutcome::Empty
                    } else {
                        info!(provider = name, count = links.len(), "Provider returned results");
                        debug!(urls = ?links.iter().map(|l| l.href.as_str()).collect::<Vec<_>>(), "Candidate links");
                        discovery.links = links;
                        discovery.provider = Some(name);
                        TierOutcome::Found(discovery.links.len())
                    }
                }
                Err(e) => {
                    warn!(provider = name, error = %e, "Provider failed; falling back");
                    TierOutcome::Failed(e.to_string())
                }
            };

            let found = matches!(outcome, TierOutcome::Found(_));
            discovery.tiers.push(TierReport {
                provider: name,
                outcome,
            });
            if found {
                return discovery;
            }
        }

        warn!(tiers = discovery.tiers.len(), "All search providers exhausted without results");
        discovery
    }
}

/// Drop duplicate hrefs (first occurrence wins) and cap the length.
fn normalize(links: Vec<CandidateLink>, desired_count: usize) -> Vec<CandidateLink> {
    links
        .into_iter()
        .unique_by(|link| link.href.clone())
        .take(desired_count)
        .collect()
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    /// Scripted provider that counts its invocations.
    pub struct StubProvider {
        pub name: &'static str,
        pub result: Result<Vec<CandidateLink>, String>,
        pub calls: Arc<AtomicUsize>,
    }

    impl StubProvider {
        pub fn returning(name: &'static str, links: Vec<CandidateLink>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    name,
                    result: Ok(links),
                    calls: Arc::clone(&calls),
                },
                calls,
            )
        }

        pub fn failing(name: &'static str, reason: &str) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    name,
                    result: Err(reason.to_string()),
                    calls: Arc::clone(&calls),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl SearchProvider for StubProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn try_discover(
            &self,
            _query: &SearchQuery,
        ) -> Result<Vec<CandidateLink>, SearchProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Ok(links) => Ok(links.clone()),
                Err(reason) => Err(SearchProviderError::Blocked(reason.clone())),
            }
        }
    }

    pub fn link(href: &str, title: &str) -> CandidateLink {
        CandidateLink::new(Url::parse(href).unwrap(), Some(title.to_string()), None)
    }
}
