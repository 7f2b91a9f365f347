//! Slide deck description ("Daily News Digest"), serialized as JSON for a
//! presentation renderer.

use crate::error::ExportError;
use crate::models::ArticleRecord;
use crate::utils::excerpt;
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

pub const DECK_TITLE: &str = "Daily News Digest";
pub const DECK_SUBTITLE: &str = "Generated Report";

/// Summary characters that fit on one slide.
pub const SLIDE_BODY_CHARS: usize = 600;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleSlide {
    pub title: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentSlide {
    pub title: String,
    pub body: String,
    /// `"Source: {url}"`
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlideDeck {
    pub title_slide: TitleSlide,
    pub slides: Vec<ContentSlide>,
}

impl SlideDeck {
    pub fn from_articles(articles: &[&ArticleRecord]) -> Self {
        Self {
            title_slide: TitleSlide {
                title: DECK_TITLE.to_string(),
                subtitle: DECK_SUBTITLE.to_string(),
            },
            slides: articles
                .iter()
                .map(|article| ContentSlide {
                    title: article.title.clone(),
                    body: excerpt(&article.summary, SLIDE_BODY_CHARS),
                    source: format!("Source: {}", article.source_url),
                })
                .collect(),
        }
    }

    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn write(&self, path: &Path) -> Result<(), ExportError> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, json).await?;
        info!(slides = self.slides.len() + 1, "Wrote slide deck");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_deck_layout() {
        let mut long = ArticleRecord::failed(Url::parse("https://a.ph/1").unwrap(), Some("Long"), &"x");
        long.summary = "word ".repeat(200);
        long.error = None;
        let short = ArticleRecord::failed(Url::parse("https://a.ph/2").unwrap(), Some("Short — “raw”"), &"x");

        let deck = SlideDeck::from_articles(&[&long, &short]);

        assert_eq!(deck.title_slide.title, "Daily News Digest");
        assert_eq!(deck.title_slide.subtitle, "Generated Report");
        assert_eq!(deck.slides.len(), 2);
        assert_eq!(deck.slides[0].body.chars().count(), SLIDE_BODY_CHARS + 3);
        assert!(deck.slides[0].body.ends_with("..."));
        assert_eq!(deck.slides[0].source, "Source: https://a.ph/1");
        assert_eq!(deck.slides[1].title, "Short — “raw”");
    }

    #[test]
    fn test_serializes_to_json() {
        let deck = SlideDeck::from_articles(&[]);
        let json = serde_json::to_value(&deck).unwrap();
        assert_eq!(json["title_slide"]["title"], "Daily News Digest");
        assert!(json["slides"].as_array().unwrap().is_empty());
    }
}
