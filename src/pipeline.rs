//! Acquisition orchestrator: search once, then fetch and extract every
//! candidate in discovery order.
//!
//! Failures below this level never escape. A link that cannot be downloaded
//! or parsed still yields an [`ArticleRecord`], flagged with its error, so the
//! output always has one record per candidate.

use crate::config::AppConfig;
use crate::extract::Extractor;
use crate::fetch::FetchChain;
use crate::models::{Advisory, ArticleRecord, CandidateLink, SearchQuery};
use crate::search::SearchChain;
use futures::stream::{self, StreamExt};
use std::error::Error;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Result of one [`Acquisition::acquire`] call.
#[derive(Debug)]
pub struct AcquireOutcome {
    /// One record per candidate, in discovery order.
    pub articles: Vec<ArticleRecord>,
    /// Set when discovery produced no candidates at all.
    pub advisory: Option<Advisory>,
    /// Which search tier supplied the candidates.
    pub provider: Option<&'static str>,
}

pub struct Acquisition {
    search: SearchChain,
    fetch: FetchChain,
    extractor: Extractor,
    concurrency: usize,
}

impl Acquisition {
    pub fn new(
        search: SearchChain,
        fetch: FetchChain,
        extractor: Extractor,
        concurrency: usize,
    ) -> Self {
        Self {
            search,
            fetch,
            extractor,
            concurrency: concurrency.max(1),
        }
    }

    /// Build fresh provider clients and fetch methods from `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, Box<dyn Error>> {
        Ok(Self::new(
            SearchChain::from_config(&config.search)?,
            FetchChain::from_config(&config.fetch)?,
            Extractor::new(&config.summary),
            config.pipeline.concurrency,
        ))
    }

    #[instrument(level = "info", skip_all, fields(keyword = %query.keyword, count = query.desired_count))]
    pub async fn acquire(&self, query: &SearchQuery) -> AcquireOutcome {
        let discovery = self.search.discover(query).await;
        for tier in &discovery.tiers {
            debug!(provider = tier.provider, outcome = %tier.outcome, "Search tier");
        }
        if discovery.is_empty() {
            warn!(advisory = Advisory::NoCandidates.message(), "No candidates to process");
            return AcquireOutcome {
                articles: Vec::new(),
                advisory: Some(Advisory::NoCandidates),
                provider: None,
            };
        }

        let total = discovery.links.len();
        info!(
            total,
            provider = discovery.provider.unwrap_or("unknown"),
            concurrency = self.concurrency,
            "Processing candidate links"
        );

        // `buffered` keeps results in input order even when several links
        // are in flight.
        let articles: Vec<ArticleRecord> = stream::iter(discovery.links.iter().enumerate())
            .map(|(i, link)| self.process(i + 1, total, link))
            .buffered(self.concurrency)
            .collect()
            .await;

        let failed = articles.iter().filter(|a| a.is_error()).count();
        info!(
            total,
            succeeded = total - failed,
            failed,
            "Finished processing candidate links"
        );

        AcquireOutcome {
            articles,
            advisory: None,
            provider: discovery.provider,
        }
    }

    async fn process(&self, position: usize, total: usize, link: &CandidateLink) -> ArticleRecord {
        let label = link.title.as_deref().unwrap_or(link.href.as_str());
        info!("Processing ({position}/{total}): {label}");
        let t0 = Instant::now();

        let record = match self.fetch.fetch(&link.href).await {
            Ok(fetched) => {
                debug!(url = %link.href, method = fetched.method, "Extracting");
                self.extractor
                    .extract(&fetched.html, &link.href, link.title.as_deref())
            }
            Err(e) => {
                warn!(url = %link.href, attempts = e.attempts, error = %e, "Giving up on link");
                ArticleRecord::failed(link.href.clone(), link.title.as_deref(), &e)
            }
        };

        info!(
            position,
            ok = !record.is_error(),
            elapsed_ms = t0.elapsed().as_millis(),
            "Link processed"
        );
        record
    }
}
