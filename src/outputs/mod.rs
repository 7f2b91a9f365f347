//! Output generation for a finished run.
//!
//! # Submodules
//!
//! - [`json`]: Writes the [`SearchReport`](crate::models::SearchReport) as JSON
//! - [`markdown`]: Renders the report as Markdown
//! - [`report`]: Printable page document, Latin-1 encoded
//! - [`slides`]: Slide deck description, JSON encoded
//!
//! The page and slide documents are exports: the caller picks which articles
//! go in with [`select`].

pub mod json;
pub mod markdown;
pub mod report;
pub mod slides;

use crate::error::ExportError;
use crate::models::ArticleRecord;
use chrono::Local;
use itertools::Itertools;
use std::path::{Path, PathBuf};

use report::PageDocument;
use slides::SlideDeck;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Printable page document
    Page,
    /// Slide deck description
    Slides,
}

impl ExportFormat {
    fn file_name(self, stamp: &str) -> String {
        match self {
            ExportFormat::Page => format!("news_report_{stamp}.txt"),
            ExportFormat::Slides => format!("news_digest_{stamp}.json"),
        }
    }
}

/// Pick articles by 1-based position. `None` selects everything.
///
/// Duplicate indices are collapsed, first occurrence wins.
///
/// # Errors
///
/// [`ExportError::NothingToExport`] when the selection (or the article list)
/// is empty, [`ExportError::BadSelection`] when an index is out of range.
pub fn select<'a>(
    articles: &'a [ArticleRecord],
    indices: Option<&[usize]>,
) -> Result<Vec<&'a ArticleRecord>, ExportError> {
    let selected: Vec<&ArticleRecord> = match indices {
        None => articles.iter().collect(),
        Some(indices) => indices
            .iter()
            .unique()
            .map(|&index| {
                index
                    .checked_sub(1)
                    .and_then(|i| articles.get(i))
                    .ok_or(ExportError::BadSelection {
                        index,
                        len: articles.len(),
                    })
            })
            .collect::<Result<_, _>>()?,
    };
    if selected.is_empty() {
        return Err(ExportError::NothingToExport);
    }
    Ok(selected)
}

/// Write the selected articles in `format` under `dir` and return the path.
pub async fn export(
    articles: &[&ArticleRecord],
    format: ExportFormat,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    if articles.is_empty() {
        return Err(ExportError::NothingToExport);
    }
    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let path = dir.join(format.file_name(&stamp));
    match format {
        ExportFormat::Page => PageDocument::from_articles(articles).write(&path).await?,
        ExportFormat::Slides => SlideDeck::from_articles(articles).write(&path).await?,
    }
    Ok(path)
}
