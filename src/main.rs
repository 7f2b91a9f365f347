//! # philinews
//!
//! Finds recent Philippine news articles for a keyword, downloads them and
//! condenses each one into a short extractive summary.
//!
//! ## Features
//!
//! - Three-tier discovery: DuckDuckGo (retried), then Google, then regional
//!   RSS feeds
//! - Three-tier download: plain request, browser headers, Chrome
//!   impersonation
//! - Metadata extraction (title, authors, date, hero image) and sentence
//!   ranking summaries
//! - JSON and Markdown reports, plus printable page and slide exports
//!
//! ## Usage
//!
//! ```sh
//! philinews "Inflation" -n 5 -j ./json -m ./markdown -e page
//! ```
//!
//! ## Architecture
//!
//! 1. **Discovery**: [`search::SearchChain`] returns candidate links
//! 2. **Download**: [`fetch::FetchChain`] gets each page's HTML
//! 3. **Extraction**: [`extract::Extractor`] builds an article record, never failing
//! 4. **Output**: reports and exports under [`outputs`]
//!
//! A failed link becomes an error-flagged record; it never aborts the run.

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod extract;
mod fetch;
mod models;
mod outputs;
mod pipeline;
mod search;
mod utils;

use cli::Cli;
use config::AppConfig;
use models::SearchReport;
use outputs::{json, markdown};
use pipeline::Acquisition;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("philinews starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = AppConfig::load(args.config.as_deref().map(Path::new))?;
    if let Some(concurrency) = args.concurrency {
        config.pipeline.concurrency = concurrency;
        config.validate()?;
    }

    // Early check: ensure output dirs are writable before spending time on the network
    for dir in std::iter::once(&args.json_output_dir).chain(args.markdown_output_dir.as_ref()) {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Output directory is not writable");
            return Err(e);
        }
    }

    if let Err(e) = extract::summarize::warm_up() {
        warn!(error = %e, "Summarizer unavailable; articles will be error-flagged");
    }

    let query = models::SearchQuery::new(args.keyword.as_str(), usize::from(args.count), args.recency)?
        .with_date_range(args.since, args.until);
    info!(
        keyword = %query.keyword,
        count = query.desired_count,
        recency = ?query.effective_recency(),
        "Starting acquisition"
    );

    let acquisition = Acquisition::from_config(&config)?;
    let outcome = acquisition.acquire(&query).await;

    if let Some(advisory) = outcome.advisory {
        warn!("{}", advisory.message());
    }

    let report = SearchReport {
        keyword: query.keyword.clone(),
        recency: query.effective_recency(),
        generated_at: Utc::now(),
        advisory: outcome.advisory,
        articles: outcome.articles,
    };
    info!(
        provider = outcome.provider.unwrap_or("none"),
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Acquisition finished"
    );

    // ---- JSON output ----
    let json_path = json::write_report(&report, &args.json_output_dir).await?;

    // ---- Markdown output ----
    if let Some(markdown_dir) = &args.markdown_output_dir {
        let (date, stem) = json::report_stem(&report);
        let path = PathBuf::from(markdown_dir).join(format!("{date}_{stem}.md"));
        info!(path = %path.display(), "Writing Markdown");
        if let Err(e) = tokio::fs::write(&path, markdown::report_to_markdown(&report)).await {
            error!(path = %path.display(), error = %e, "Failed writing Markdown");
        } else {
            info!(path = %path.display(), "Wrote Markdown report");
        }
    }

    // ---- Exports ----
    if !args.export.is_empty() {
        let export_dir = args
            .export_dir
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| json_path.parent().map(Path::to_path_buf).unwrap_or_default());
        match outputs::select(&report.articles, args.select.as_deref()) {
            Ok(selected) => {
                for format in &args.export {
                    match outputs::export(&selected, *format, &export_dir).await {
                        Ok(path) => info!(?format, path = %path.display(), "Exported document"),
                        Err(e) => error!(?format, error = %e, "Export failed"),
                    }
                }
            }
            Err(e) => error!(error = %e, "Export skipped"),
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
