//! Markdown rendering of a [`SearchReport`].

use crate::models::SearchReport;
use chrono::Local;

/// Render a report as a readable Markdown document.
///
/// Successful articles get their metadata, hero image and summary.
/// Error-flagged ones are listed with the failure reason so a reader can
/// still follow the source link.
pub fn report_to_markdown(report: &SearchReport) -> String {
    let generated = report.generated_at.with_timezone(&Local);
    let mut md = String::new();

    md.push_str(&format!("# News: {}\n\n", report.keyword));
    md.push_str(&format!(
        "_Generated {} · {} succeeded, {} failed_\n\n",
        generated.format("%Y-%m-%d %H:%M"),
        report.succeeded(),
        report.failed()
    ));

    if let Some(advisory) = report.advisory {
        md.push_str(&format!("> {}\n", advisory.message()));
        return md;
    }

    for (i, article) in report.articles.iter().enumerate() {
        md.push_str(&format!("## {}. {}\n\n", i + 1, article.title));

        if let Some(error) = &article.error {
            md.push_str(&format!("**Could not extract this article:** {error}\n\n"));
            md.push_str(&format!("[Source]({})\n\n", article.source_url));
            continue;
        }

        let published = article
            .publish_date
            .map(|d| d.with_timezone(&Local).format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "Date Unknown".to_string());
        md.push_str(&format!(
            "- **Published:** {}\n- **Authors:** {}\n",
            published,
            article.byline()
        ));
        if let Some(tag) = article.source_tag() {
            md.push_str(&format!("- **Source:** [{}]({})\n\n", tag, article.source_url));
        } else {
            md.push_str(&format!("- **Source:** <{}>\n\n", article.source_url));
        }

        if let Some(image) = &article.hero_image {
            md.push_str(&format!("![{}]({})\n\n", article.title, image));
        }

        for line in article.summary.lines().filter(|l| !l.trim().is_empty()) {
            md.push_str(line.trim());
            md.push_str("\n\n");
        }
    }

    md
}
