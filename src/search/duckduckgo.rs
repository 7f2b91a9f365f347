//! Primary discovery tier: DuckDuckGo HTML search.
//!
//! Queries the JavaScript-free endpoint at `html.duckduckgo.com` with a region
//! code (`kl`) and a recency bucket (`df`). Result links are DuckDuckGo
//! redirects (`//duckduckgo.com/l/?uddg=<encoded target>`) and are unwrapped
//! before they leave this module.
//!
//! When DuckDuckGo suspects automation it answers with an "anomaly" challenge
//! page instead of results. That page is reported as
//! [`SearchProviderError::Blocked`] so the surrounding retry policy kicks in.

use super::SearchProvider;
use crate::config::{DEFAULT_USER_AGENT, SearchConfig};
use crate::error::SearchProviderError;
use crate::models::{CandidateLink, SearchQuery};
use crate::utils::{collapse_whitespace, truncate_for_log};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

const ENDPOINT: &str = "https://html.duckduckgo.com/html/";

static RESULT: Lazy<Selector> = Lazy::new(|| Selector::parse(".result").unwrap());
static RESULT_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a.result__a").unwrap());
static RESULT_SNIPPET: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.result__snippet, .result__snippet").unwrap());
static ANOMALY: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".anomaly-modal, #challenge-form, form[action*='anomaly']").unwrap());

pub struct DuckDuckGo {
    client: Client,
    region: String,
    region_label: String,
}

impl DuckDuckGo {
    pub fn new(config: &SearchConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            region: config.ddg_region.clone(),
            region_label: config.region_label.clone(),
        })
    }

    fn request_url(&self, query: &SearchQuery) -> String {
        format!(
            "{}?q={}&kl={}&df={}",
            ENDPOINT,
            urlencoding::encode(&query.regional_text(&self.region_label)),
            urlencoding::encode(&self.region),
            query.effective_recency().ddg_code()
        )
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGo {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    #[instrument(level = "info", skip_all, fields(keyword = %query.keyword))]
    async fn try_discover(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<CandidateLink>, SearchProviderError> {
        let url = self.request_url(query);
        debug!(%url, "Querying DuckDuckGo");

        let response = self
            .client
            .get(&url)
            .header("Accept", "text/html")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchProviderError::Status(status));
        }
        let body = response.text().await?;

        let links = parse_results(&body, query.desired_count)?;
        if links.is_empty() {
            debug!(preview = %truncate_for_log(&body, 300), "DuckDuckGo page had no results");
        }
        info!(count = links.len(), "Parsed DuckDuckGo results");
        Ok(links)
    }
}

/// Pull up to `limit` organic results out of a DuckDuckGo HTML page.
pub(crate) fn parse_results(
    html: &str,
    limit: usize,
) -> Result<Vec<CandidateLink>, SearchProviderError> {
    let document = Html::parse_document(html);

    if document.select(&ANOMALY).next().is_some() {
        return Err(SearchProviderError::Blocked(
            "DuckDuckGo served an anomaly challenge".to_string(),
        ));
    }

    let mut links = Vec::new();
    for result in document.select(&RESULT) {
        if links.len() >= limit {
            break;
        }
        if result.value().classes().any(|c| c == "result--ad") {
            continue;
        }
        let Some(anchor) = result.select(&RESULT_LINK).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href").and_then(resolve_href) else {
            continue;
        };
        let title = collapse_whitespace(&anchor.text().collect::<String>());
        let snippet = result
            .select(&RESULT_SNIPPET)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()));

        links.push(CandidateLink::new(href, Some(title), snippet));
    }
    Ok(links)
}

/// Unwrap a DuckDuckGo redirect link into its destination.
///
/// Accepts protocol-relative (`//duckduckgo.com/l/?uddg=...`), relative
/// (`/l/?uddg=...`) and already-direct `http(s)` links.
fn resolve_href(href: &str) -> Option<Url> {
    let base = Url::parse("https://duckduckgo.com/").ok()?;
    let url = base.join(href).ok()?;

    let is_ddg = url
        .host_str()
        .is_some_and(|h| h == "duckduckgo.com" || h.ends_with(".duckduckgo.com"));
    let target = if is_ddg {
        let (_, encoded) = url.query_pairs().find(|(k, _)| k == "uddg")?;
        Url::parse(&encoded).ok()?
    } else {
        url
    };

    matches!(target.scheme(), "http" | "https").then_some(target)
}
