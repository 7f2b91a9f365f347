//! Structural parse of an article page.
//!
//! Every field is looked up in several places, most reliable first: JSON-LD,
//! then OpenGraph / article meta tags, then visible markup. Missing fields
//! stay empty; deciding whether that is fatal is left to the caller.

use super::jsonld::{self, JsonLdArticle};
use crate::utils::collapse_whitespace;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

fn sel(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

static META: Lazy<Selector> = Lazy::new(|| sel("meta[content]"));
static TITLE: Lazy<Selector> = Lazy::new(|| sel("title"));
static H1: Lazy<Selector> = Lazy::new(|| sel("h1"));
static REL_AUTHOR: Lazy<Selector> = Lazy::new(|| sel("a[rel='author'], [itemprop='author'] [itemprop='name']"));
static BYLINE: Lazy<Selector> =
    Lazy::new(|| sel(".byline, .author-name, .article-author, .author, [class*='byline']"));
static TIME: Lazy<Selector> = Lazy::new(|| sel("time[datetime]"));
static IMAGE_SRC: Lazy<Selector> = Lazy::new(|| sel("link[rel='image_src'][href]"));
static IMG: Lazy<Selector> = Lazy::new(|| sel("article img[src], main img[src], img[src]"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| sel("p"));

/// Content containers, most specific first.
static CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "[itemprop='articleBody']",
        "article",
        ".article-body",
        ".entry-content",
        ".story-content",
        "main",
        "[role='main']",
        "#content",
    ]
    .iter()
    .map(|css| sel(css))
    .collect()
});

/// `/2025/06/04/` style date segments in article URLs.
static URL_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/((?:19|20)\d{2})/(\d{1,2})/(\d{1,2})(?:/|$)").unwrap());

/// Title separators used by news sites: `"Headline | Site"`.
const TITLE_SEPARATORS: [&str; 4] = [" | ", " - ", " – ", " — "];

/// Paragraphs shorter than this are navigation, captions or share widgets.
const MIN_PARAGRAPH_CHARS: usize = 30;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocument {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub publish_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub body: String,
    pub hero_image: Option<Url>,
}

/// Parse an article page fetched from `url`.
pub fn parse(html: &str, url: &Url) -> ParsedDocument {
    let document = Html::parse_document(html);
    let ld = jsonld::extract_article(&document);

    ParsedDocument {
        title: title(&document, &ld, url),
        authors: authors(&document, &ld),
        publish_date: publish_date(&document, &ld, url),
        description: meta(&document, &["og:description", "description", "twitter:description"]),
        body: body(&document),
        hero_image: hero_image(&document, &ld, url),
    }
}

/// First non-empty `content` among meta tags whose `property`, `name` or
/// `itemprop` is in `keys`, honoring the order of `keys`.
fn meta(document: &Html, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        document.select(&META).find_map(|el| {
            let attrs = el.value();
            let matches = [attrs.attr("property"), attrs.attr("name"), attrs.attr("itemprop")]
                .into_iter()
                .flatten()
                .any(|k| k.eq_ignore_ascii_case(key));
            if !matches {
                return None;
            }
            attrs
                .attr("content")
                .map(collapse_whitespace)
                .filter(|c| !c.is_empty())
        })
    })
}

fn text_of(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

fn title(document: &Html, ld: &JsonLdArticle, url: &Url) -> Option<String> {
    meta(document, &["og:title", "twitter:title"])
        .or_else(|| ld.headline.clone())
        .or_else(|| {
            let site_name = meta(document, &["og:site_name", "application-name"]);
            document
                .select(&TITLE)
                .next()
                .map(text_of)
                .map(|t| strip_site_name(&t, url, site_name.as_deref()))
                .filter(|t| !t.is_empty())
        })
        .or_else(|| document.select(&H1).map(text_of).find(|t| !t.is_empty()))
}

/// Drop a leading or trailing `<title>` segment naming the site:
/// `"Inflation slows | Inquirer News"` and `"Inquirer.net | Inflation slows"`
/// both give `"Inflation slows"`. Separators inside the headline itself
/// are left alone.
fn strip_site_name(title: &str, url: &Url, site_name: Option<&str>) -> String {
    let title = title.trim();
    let names = site_names(url, site_name);
    for separator in TITLE_SEPARATORS {
        if let Some((head, tail)) = title.rsplit_once(separator) {
            if !head.trim().is_empty() && names_site(tail, &names) {
                return head.trim().to_string();
            }
        }
        if let Some((head, tail)) = title.split_once(separator) {
            if !tail.trim().is_empty() && names_site(head, &names) {
                return tail.trim().to_string();
            }
        }
    }
    title.to_string()
}

/// Normalized names a site goes by: the distinctive host labels
/// (`newsinfo.inquirer.net` gives `newsinfo` and `inquirer`) plus the
/// declared site name.
fn site_names(url: &Url, site_name: Option<&str>) -> Vec<String> {
    let mut names: Vec<String> = url
        .host_str()
        .map(|host| {
            let labels: Vec<&str> = host.split('.').collect();
            let keep = labels.len().saturating_sub(1);
            labels
                .into_iter()
                .take(keep)
                .filter(|l| !matches!(*l, "www" | "com" | "net" | "org" | "gov" | "edu" | "news"))
                .map(normalize_name)
                .filter(|l| l.len() >= 3)
                .collect()
        })
        .unwrap_or_default();
    names.extend(site_name.map(normalize_name).filter(|n| n.len() >= 3));
    names
}

fn names_site(segment: &str, names: &[String]) -> bool {
    let segment = normalize_name(segment);
    segment.len() >= 3
        && names
            .iter()
            .any(|name| segment.contains(name.as_str()) || name.contains(segment.as_str()))
}

fn normalize_name(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn authors(document: &Html, ld: &JsonLdArticle) -> Vec<String> {
    let mut raw: Vec<String> = ld.authors.clone();
    if raw.is_empty() {
        raw.extend(meta(document, &["author", "article:author", "dc.creator", "parsely-author"]));
    }
    if raw.is_empty() {
        raw.extend(document.select(&REL_AUTHOR).map(text_of));
    }
    if raw.is_empty() {
        raw.extend(document.select(&BYLINE).map(text_of).take(1));
    }

    let mut authors: Vec<String> = Vec::new();
    for name in raw.iter().flat_map(|r| split_byline(r)) {
        if !authors.iter().any(|a| a.eq_ignore_ascii_case(&name)) {
            authors.push(name);
        }
    }
    authors
}

/// `"By Juan Dela Cruz and Maria Santos"` → both names. Profile URLs that
/// some sites put in `article:author` are discarded.
fn split_byline(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    let without_by = trimmed
        .strip_prefix("By ")
        .or_else(|| trimmed.strip_prefix("by "))
        .or_else(|| trimmed.strip_prefix("BY "))
        .unwrap_or(trimmed);
    without_by
        .split(" and ")
        .flat_map(|part| part.split(','))
        .map(str::trim)
        .filter(|n| !n.is_empty() && !n.starts_with("http") && n.len() <= 80)
        .map(str::to_string)
        .collect()
}

fn publish_date(document: &Html, ld: &JsonLdArticle, url: &Url) -> Option<DateTime<Utc>> {
    ld.date_published
        .as_deref()
        .and_then(parse_date)
        .or_else(|| {
            meta(
                document,
                &[
                    "article:published_time",
                    "og:published_time",
                    "datePublished",
                    "pubdate",
                    "publishdate",
                    "date",
                    "dc.date",
                ],
            )
            .as_deref()
            .and_then(parse_date)
        })
        .or_else(|| {
            document
                .select(&TIME)
                .filter_map(|el| el.value().attr("datetime"))
                .find_map(parse_date)
        })
        .or_else(|| date_from_url(url))
}

/// Parse the date formats news sites put in metadata.
pub(crate) fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%d %H:%M:%S%z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for format in ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
        }
    }
    None
}

fn date_from_url(url: &Url) -> Option<DateTime<Utc>> {
    let caps = URL_DATE.captures(url.path())?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn body(document: &Html) -> String {
    for container in CONTAINERS.iter() {
        for root in document.select(container) {
            let paragraphs = paragraphs(root.select(&PARAGRAPH));
            if !paragraphs.is_empty() {
                return paragraphs.join("\n\n");
            }
        }
    }
    paragraphs(document.select(&PARAGRAPH)).join("\n\n")
}

fn paragraphs<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> Vec<String> {
    elements
        .map(text_of)
        .filter(|p| p.chars().count() >= MIN_PARAGRAPH_CHARS)
        .collect()
}

fn hero_image(document: &Html, ld: &JsonLdArticle, url: &Url) -> Option<Url> {
    meta(document, &["og:image", "og:image:url", "twitter:image", "twitter:image:src"])
        .or_else(|| ld.image.clone())
        .or_else(|| {
            document
                .select(&IMAGE_SRC)
                .find_map(|el| el.value().attr("href").map(str::to_string))
        })
        .or_else(|| {
            document
                .select(&IMG)
                .filter_map(|el| el.value().attr("src"))
                .find(|src| !src.starts_with("data:"))
                .map(str::to_string)
        })
        .and_then(|src| url.join(src.trim()).ok())
        .filter(|u| matches!(u.scheme(), "http" | "https"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    const ARTICLE: &str = r#"
        <html><head>
          <title>Inflation slows to 2.1% | Inquirer Business</title>
          <meta property="og:title" content="Inflation slows to 2.1% in May">
          <meta name="author" content="By Ana Reyes and Ben Cruz">
          <meta property="article:published_time" content="2025-06-05T09:00:00+08:00">
          <meta property="og:image" content="/images/hero.jpg">
          <meta name="description" content="Prices rose at the slowest pace in five years.">
        </head><body>
          <nav><p>Home | Business | Sports and other sections of this site</p></nav>
          <article>
            <h1>Inflation slows to 2.1%</h1>
            <p>Share</p>
            <p>Headline inflation eased to 2.1 percent in May, the Philippine Statistics Authority said.</p>
            <p>Food prices, particularly rice, drove the slowdown according to the agency.</p>
          </article>
        </body></html>
    "#;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_parse_full_article() {
        let doc = parse(ARTICLE, &url("https://business.inquirer.net/2025/06/05/inflation"));
        assert_eq!(doc.title.as_deref(), Some("Inflation slows to 2.1% in May"));
        assert_eq!(doc.authors, vec!["Ana Reyes", "Ben Cruz"]);
        let date = doc.publish_date.unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2025, 6, 5));
        assert_eq!(
            doc.hero_image.map(|u| u.to_string()).as_deref(),
            Some("https://business.inquirer.net/images/hero.jpg")
        );
        assert!(doc.body.starts_with("Headline inflation eased"));
        assert!(doc.body.contains("\n\nFood prices"));
        assert!(!doc.body.contains("Share"));
        assert!(!doc.body.contains("Sports"));
    }

    #[test]
    fn test_title_fallbacks() {
        let doc = parse(
            "<html><head><title>Traffic on EDSA - Philstar.com</title></head></html>",
            &url("https://www.philstar.com/x"),
        );
        assert_eq!(doc.title.as_deref(), Some("Traffic on EDSA"));

        let doc = parse("<html><body><h1> Only a heading </h1></body></html>", &url("https://a.ph/"));
        assert_eq!(doc.title.as_deref(), Some("Only a heading"));
    }

    #[test]
    fn test_title_keeps_separators_inside_headline() {
        let doc = parse(
            "<html><head><title>Marcos - Duterte rift deepens over budget</title></head></html>",
            &url("https://www.rappler.com/nation/rift"),
        );
        assert_eq!(doc.title.as_deref(), Some("Marcos - Duterte rift deepens over budget"));

        let doc = parse(
            "<html><head><title>Marcos - Duterte rift deepens | Rappler</title></head></html>",
            &url("https://www.rappler.com/nation/rift"),
        );
        assert_eq!(doc.title.as_deref(), Some("Marcos - Duterte rift deepens"));
    }

    #[test]
    fn test_title_drops_leading_site_name() {
        let doc = parse(
            "<html><head><title>Inquirer.net | Senate passes rice tariff bill</title></head></html>",
            &url("https://newsinfo.inquirer.net/2025/06/05/rice"),
        );
        assert_eq!(doc.title.as_deref(), Some("Senate passes rice tariff bill"));

        let doc = parse(
            r#"<html><head><meta property="og:site_name" content="GMA News Online">
               <title>GMA News Online - Typhoon signal raised over Luzon</title></head></html>"#,
            &url("https://www.gmanetwork.com/news/story"),
        );
        assert_eq!(doc.title.as_deref(), Some("Typhoon signal raised over Luzon"));
    }

    #[test]
    fn test_date_from_url() {
        let doc = parse("<html></html>", &url("https://www.rappler.com/2024/11/30/story/"));
        let date = doc.publish_date.unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 11, 30));
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("2025-06-05T09:00:00+08:00").is_some());
        assert!(parse_date("Thu, 05 Jun 2025 09:00:00 +0800").is_some());
        assert!(parse_date("2025-06-05 09:00:00").is_some());
        assert!(parse_date("2025-06-05").is_some());
        assert!(parse_date("June 5, 2025").is_some());
        assert!(parse_date("yesterday").is_none());
    }

    #[test]
    fn test_byline_split() {
        assert_eq!(split_byline("by Juan Dela Cruz, Maria Santos"), vec!["Juan Dela Cruz", "Maria Santos"]);
        assert!(split_byline("https://www.facebook.com/inquirer").is_empty());
    }

    #[test]
    fn test_body_falls_back_to_all_paragraphs() {
        let html = "<html><body><div><p>This paragraph lives outside of any article container.</p></div></body></html>";
        let doc = parse(html, &url("https://a.ph/"));
        assert_eq!(doc.body, "This paragraph lives outside of any article container.");
    }

    #[test]
    fn test_empty_document() {
        let doc = parse("", &url("https://a.ph/"));
        assert_eq!(doc.title, None);
        assert!(doc.body.is_empty());
        assert!(doc.authors.is_empty());
    }
}
