//! Command-line interface definitions for philinews.
//!
//! All arguments can be provided via command-line flags; the config path and
//! output directories also fall back to environment variables.

use crate::models::{RecencyWindow, SearchQuery};
use crate::outputs::ExportFormat;
use chrono::NaiveDate;
use clap::Parser;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Five articles from the last day, JSON report only
/// philinews "Inflation" -j ./json
///
/// # Ten articles from the last week, Markdown too, plus a printable page
/// philinews "Sara Duterte" -n 10 -r week -j ./json -m ./markdown -e page
///
/// # Only articles 1 and 3 in the slide deck
/// philinews "Traffic" -j ./json -e slides --select 1,3
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Keyword to search news for
    pub keyword: String,

    /// Number of articles to fetch (1-20)
    #[arg(short = 'n', long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..=SearchQuery::MAX_COUNT as i64))]
    pub count: u8,

    /// How recent the articles must be
    #[arg(short, long, value_enum, default_value_t = RecencyWindow::Day)]
    pub recency: RecencyWindow,

    /// Earliest publication date (YYYY-MM-DD); widens the search to a month
    #[arg(long)]
    pub since: Option<NaiveDate>,

    /// Latest publication date (YYYY-MM-DD); widens the search to a month
    #[arg(long)]
    pub until: Option<NaiveDate>,

    /// Output directory for the JSON report
    #[arg(short, long, env = "PHILINEWS_JSON_DIR")]
    pub json_output_dir: String,

    /// Output directory for the Markdown report
    #[arg(short, long, env = "PHILINEWS_MARKDOWN_DIR")]
    pub markdown_output_dir: Option<String>,

    /// Documents to export (repeatable or comma separated)
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub export: Vec<ExportFormat>,

    /// Directory for exported documents (defaults to the JSON directory)
    #[arg(long)]
    pub export_dir: Option<String>,

    /// 1-based article numbers to export, e.g. `1,3,4` (defaults to all)
    #[arg(long, value_delimiter = ',')]
    pub select: Option<Vec<usize>>,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "PHILINEWS_CONFIG")]
    pub config: Option<String>,

    /// Links processed at once; overrides the config file
    #[arg(long)]
    pub concurrency: Option<usize>,
}
