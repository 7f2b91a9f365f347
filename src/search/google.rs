//! Secondary discovery tier: Google web search.
//!
//! Google's markup comes in more than one shape. The usual one has a title
//! (`<h3>`) inside every result anchor plus a snippet block, and those become
//! full [`CandidateLink`]s. Stripped-down variants (basic HTML, consent
//! interstitials, some mobile layouts) carry only `/url?q=<target>` anchors.
//! When the rich shape is missing, the parser degrades to collecting those
//! bare URLs with no title or snippet.

use super::SearchProvider;
use crate::config::{DEFAULT_USER_AGENT, SearchConfig};
use crate::error::SearchProviderError;
use crate::models::{CandidateLink, SearchQuery};
use crate::utils::{collapse_whitespace, truncate_for_log};
use async_trait::async_trait;
use itertools::Itertools;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

const ENDPOINT: &str = "https://www.google.com/search";

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h3").unwrap());
static SNIPPET: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".VwiC3b, [data-sncf], .IsZvec, .st, .BNeawe.s3v9rd").unwrap());
static CAPTCHA: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#captcha-form, form[action*='sorry']").unwrap());

/// Result block class names, newest layout first.
const BLOCK_CLASSES: [&str; 4] = ["g", "MjjYud", "tF2Cxc", "Gx5Zad"];

/// The page did not have the rich result layout.
#[derive(Debug)]
struct ShapeMismatch;

pub struct Google {
    client: Client,
    region_label: String,
}

impl Google {
    pub fn new(config: &SearchConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            region_label: config.region_label.clone(),
        })
    }

    fn request_url(&self, query: &SearchQuery) -> String {
        format!(
            "{}?q={}&num={}&hl=en&tbs={}",
            ENDPOINT,
            urlencoding::encode(&query.regional_text(&self.region_label)),
            query.desired_count,
            urlencoding::encode(query.effective_recency().google_tbs())
        )
    }
}

#[async_trait]
impl SearchProvider for Google {
    fn name(&self) -> &'static str {
        "google"
    }

    #[instrument(level = "info", skip_all, fields(keyword = %query.keyword))]
    async fn try_discover(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<CandidateLink>, SearchProviderError> {
        info!("Falling back to Google search");
        let url = self.request_url(query);
        debug!(%url, "Querying Google");

        let response = self
            .client
            .get(&url)
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-US,en;q=0.5")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchProviderError::Status(status));
        }
        let body = response.text().await?;

        let links = parse_results(&body, query.desired_count)?;
        if links.is_empty() {
            debug!(preview = %truncate_for_log(&body, 300), "Google page had no results");
        }
        info!(count = links.len(), "Parsed Google results");
        Ok(links)
    }
}

/// Parse a Google results page, rich form first, URL-only as fallback.
pub(crate) fn parse_results(
    html: &str,
    limit: usize,
) -> Result<Vec<CandidateLink>, SearchProviderError> {
    let document = Html::parse_document(html);

    if document.select(&CAPTCHA).next().is_some() {
        return Err(SearchProviderError::Blocked(
            "Google served a captcha page".to_string(),
        ));
    }

    match parse_rich(&document, limit) {
        Ok(links) => Ok(links),
        Err(ShapeMismatch) => {
            warn!("Google rich results unavailable; degrading to URL-only results");
            Ok(parse_bare(&document, limit))
        }
    }
}

fn parse_rich(document: &Html, limit: usize) -> Result<Vec<CandidateLink>, ShapeMismatch> {
    let mut saw_titled_anchor = false;
    let links: Vec<CandidateLink> = document
        .select(&ANCHOR)
        .filter_map(|anchor| {
            let heading = anchor.select(&HEADING).next()?;
            saw_titled_anchor = true;
            let href = resolve_href(anchor.value().attr("href")?)?;
            let title = collapse_whitespace(&heading.text().collect::<String>());
            let snippet = result_block(anchor)
                .and_then(|block| block.select(&SNIPPET).next())
                .map(|el| collapse_whitespace(&el.text().collect::<String>()));
            Some(CandidateLink::new(href, Some(title), snippet))
        })
        .unique_by(|link| link.href.clone())
        .take(limit)
        .collect();

    if saw_titled_anchor {
        Ok(links)
    } else {
        Err(ShapeMismatch)
    }
}

fn parse_bare(document: &Html, limit: usize) -> Vec<CandidateLink> {
    document
        .select(&ANCHOR)
        .filter_map(|anchor| resolve_href(anchor.value().attr("href")?))
        .unique()
        .take(limit)
        .map(CandidateLink::bare)
        .collect()
}

/// Nearest ancestor that looks like a result container.
fn result_block(anchor: ElementRef<'_>) -> Option<ElementRef<'_>> {
    anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().classes().any(|c| BLOCK_CLASSES.contains(&c)))
}

/// Turn a result anchor into its destination, unwrapping `/url?q=` redirects
/// and dropping Google's own navigation links.
fn resolve_href(href: &str) -> Option<Url> {
    let base = Url::parse("https://www.google.com/").ok()?;
    let url = base.join(href).ok()?;

    let target = if is_google_host(&url) {
        if url.path() != "/url" {
            return None;
        }
        let (_, encoded) = url
            .query_pairs()
            .find(|(k, _)| k == "q" || k == "url")?;
        Url::parse(&encoded).ok()?
    } else {
        url
    };

    if is_google_host(&target) || !matches!(target.scheme(), "http" | "https") {
        return None;
    }
    Some(target)
}

fn is_google_host(url: &Url) -> bool {
    url.host_str().is_some_and(|host| {
        host == "google.com"
            || host.ends_with(".google.com")
            || host.starts_with("google.")
            || host.contains(".google.")
            || host.ends_with("googleusercontent.com")
            || host.ends_with("gstatic.com")
    })
}
