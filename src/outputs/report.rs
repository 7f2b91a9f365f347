//! Printable page document ("Daily News Report").
//!
//! The target renderer only understands a single-byte encoding, so every
//! string goes through [`sanitize_latin1`] before it is written: typographic
//! punctuation and common accented letters are folded to ASCII and anything
//! else outside Latin-1 becomes `?`.

use crate::error::ExportError;
use crate::models::ArticleRecord;
use crate::utils::collapse_whitespace;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

pub const PAGE_TITLE: &str = "Daily News Report";
pub const PAGE_SUBTITLE: &str = "Generated for Journalists";
pub const LINK_TEXT: &str = "Read Original Article";

/// Fixed substitutions applied before the Latin-1 cut.
const SUBSTITUTIONS: [(char, &str); 38] = [
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{2026}', "..."),
    ('é', "e"),
    ('è', "e"),
    ('ê', "e"),
    ('ë', "e"),
    ('á', "a"),
    ('à', "a"),
    ('â', "a"),
    ('ä', "a"),
    ('í', "i"),
    ('ì', "i"),
    ('î', "i"),
    ('ï', "i"),
    ('ó', "o"),
    ('ò', "o"),
    ('ô', "o"),
    ('ö', "o"),
    ('ú', "u"),
    ('ù', "u"),
    ('û', "u"),
    ('ü', "u"),
    ('ñ', "n"),
    ('Ñ', "N"),
    ('É', "E"),
    ('È', "E"),
    ('Á', "A"),
    ('À', "A"),
    ('Í', "I"),
    ('Ó', "O"),
    ('Ú', "U"),
    ('Ü', "U"),
    ('\u{00A0}', " "),
];

/// Fold `text` into characters the page renderer can encode.
pub fn sanitize_latin1(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if let Some((_, replacement)) = SUBSTITUTIONS.iter().find(|(from, _)| *from == c) {
            out.push_str(replacement);
        } else if u32::from(c) <= 0xFF {
            out.push(c);
        } else {
            out.push('?');
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageSection {
    /// `"{i}. {title}"`
    pub heading: String,
    /// `"Published: {date} | Authors: {names}"`
    pub metadata: String,
    pub link_text: String,
    pub link_url: String,
    /// Summary with line breaks flattened.
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageDocument {
    pub title: String,
    pub subtitle: String,
    pub sections: Vec<PageSection>,
}

impl PageDocument {
    /// Build the document. Articles without a title are left out; sections
    /// are numbered in the order they appear.
    pub fn from_articles(articles: &[&ArticleRecord]) -> Self {
        let sections = articles
            .iter()
            .filter(|a| !a.title.trim().is_empty())
            .enumerate()
            .map(|(i, article)| {
                let published = article
                    .publish_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "Date Unknown".to_string());
                PageSection {
                    heading: sanitize_latin1(&format!("{}. {}", i + 1, article.title.trim())),
                    metadata: sanitize_latin1(&format!(
                        "Published: {} | Authors: {}",
                        published,
                        article.authors.join(", ")
                    )),
                    link_text: LINK_TEXT.to_string(),
                    link_url: article.source_url.to_string(),
                    summary: sanitize_latin1(&collapse_whitespace(&article.summary)),
                }
            })
            .collect();

        Self {
            title: PAGE_TITLE.to_string(),
            subtitle: PAGE_SUBTITLE.to_string(),
            sections,
        }
    }

    /// Plain-text layout: title page, then one block per section.
    pub fn to_text(&self) -> String {
        let mut text = format!("{}\n{}\n", self.title, self.subtitle);
        for section in &self.sections {
            text.push('\n');
            text.push_str(&section.heading);
            text.push('\n');
            text.push_str(&section.metadata);
            text.push('\n');
            text.push_str(&format!("{}: {}\n", section.link_text, section.link_url));
            text.push_str(&section.summary);
            text.push('\n');
        }
        text
    }

    /// The text layout encoded as Latin-1.
    pub fn to_latin1_bytes(&self) -> Vec<u8> {
        sanitize_latin1(&self.to_text())
            .chars()
            .map(|c| u8::try_from(c).unwrap_or(b'?'))
            .collect()
    }

    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn write(&self, path: &Path) -> Result<(), ExportError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, self.to_latin1_bytes()).await?;
        info!(sections = self.sections.len(), "Wrote page document");
        Ok(())
    }
}
