//! Turn a downloaded page into an [`ArticleRecord`].
//!
//! [`Extractor::extract`] never fails. Anything that goes wrong while
//! parsing or summarizing produces an error-flagged record instead, so one
//! bad page cannot break a batch.

pub mod document;
pub mod jsonld;
pub mod summarize;

use crate::config::SummaryConfig;
use crate::error::ExtractionError;
use crate::models::{ArticleRecord, UNTITLED_PLACEHOLDER};
use crate::utils::lead_excerpt;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Clone)]
pub struct Extractor {
    max_sentences: usize,
    excerpt_chars: usize,
}

impl Extractor {
    pub fn new(config: &SummaryConfig) -> Self {
        Self {
            max_sentences: config.max_sentences,
            excerpt_chars: config.excerpt_chars,
        }
    }

    /// Build a record from `html`. `initial_title` is the title the search
    /// result offered, used when the page has none.
    pub fn extract(&self, html: &str, url: &Url, initial_title: Option<&str>) -> ArticleRecord {
        match self.try_extract(html, url, initial_title) {
            Ok(record) => record,
            Err(e) => {
                warn!(%url, error = %e, "Extraction failed");
                ArticleRecord::failed(url.clone(), initial_title, &e)
            }
        }
    }

    fn try_extract(
        &self,
        html: &str,
        url: &Url,
        initial_title: Option<&str>,
    ) -> Result<ArticleRecord, ExtractionError> {
        if html.trim().is_empty() {
            return Err(ExtractionError::EmptyDocument);
        }

        let parsed = document::parse(html, url);
        if parsed.title.is_none() && parsed.body.is_empty() {
            return Err(ExtractionError::NoContent);
        }

        let title = parsed
            .title
            .or_else(|| {
                initial_title
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| UNTITLED_PLACEHOLDER.to_string());

        let sentences = summarize::summarize(&title, &parsed.body, self.max_sentences)?;
        let summary = if !sentences.is_empty() {
            sentences.join("\n")
        } else if !parsed.body.is_empty() {
            lead_excerpt(&parsed.body, self.excerpt_chars)
        } else {
            parsed.description.unwrap_or_else(|| title.clone())
        };

        debug!(
            %url,
            %title,
            authors = parsed.authors.len(),
            body_chars = parsed.body.len(),
            sentences = sentences.len(),
            "Extracted article"
        );

        Ok(ArticleRecord {
            title,
            authors: parsed.authors,
            publish_date: parsed.publish_date,
            summary,
            body: parsed.body,
            hero_image: parsed.hero_image,
            source_url: url.clone(),
            error: None,
        })
    }
}
