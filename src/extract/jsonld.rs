//! `application/ld+json` article metadata.
//!
//! News sites embed schema.org `NewsArticle` objects, sometimes wrapped in an
//! array or an `@graph`. The best-ranked article-like object wins.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;

static LD_JSON: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script[type='application/ld+json']").unwrap());

const ARTICLE_TYPES: [&str; 6] = [
    "NewsArticle",
    "Article",
    "ReportageNewsArticle",
    "AnalysisNewsArticle",
    "BlogPosting",
    "WebPage",
];

/// Article fields found in JSON-LD metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonLdArticle {
    pub headline: Option<String>,
    pub authors: Vec<String>,
    pub date_published: Option<String>,
    pub image: Option<String>,
}

/// Extracts the first article-typed JSON-LD object in the document.
///
/// Handles top-level arrays and `@graph` containers. `WebPage` objects are
/// only used when no more specific article type is present.
pub fn extract_article(document: &Html) -> JsonLdArticle {
    let mut candidates = Vec::new();
    for script in document.select(&LD_JSON) {
        let content = script.text().collect::<String>();
        let content = content
            .trim()
            .trim_start_matches("<![CDATA[")
            .trim_end_matches("]]>")
            .trim();
        if let Ok(json) = serde_json::from_str::<Value>(content) {
            collect_objects(json, &mut candidates);
        }
    }

    let best = candidates
        .iter()
        .filter_map(|obj| type_rank(obj).map(|rank| (rank, obj)))
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, obj)| obj);

    match best {
        Some(obj) => JsonLdArticle {
            headline: string_field(obj, "headline").or_else(|| string_field(obj, "name")),
            authors: extract_authors(obj),
            date_published: string_field(obj, "datePublished")
                .or_else(|| string_field(obj, "dateCreated")),
            image: extract_image(obj),
        },
        None => JsonLdArticle::default(),
    }
}

fn collect_objects(json: Value, out: &mut Vec<Value>) {
    match json {
        Value::Array(items) => {
            for item in items {
                collect_objects(item, out);
            }
        }
        Value::Object(mut obj) => {
            if let Some(graph) = obj.remove("@graph") {
                collect_objects(graph, out);
            }
            out.push(Value::Object(obj));
        }
        _ => {}
    }
}

/// Position in [`ARTICLE_TYPES`], lower is better. `@type` may be a list.
fn type_rank(obj: &Value) -> Option<usize> {
    let rank_of = |t: &str| ARTICLE_TYPES.iter().position(|known| *known == t);
    match obj.get("@type")? {
        Value::String(t) => rank_of(t),
        Value::Array(types) => types.iter().filter_map(Value::as_str).filter_map(rank_of).min(),
        _ => None,
    }
}

fn string_field(obj: &Value, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn extract_authors(obj: &Value) -> Vec<String> {
    let mut authors = Vec::new();
    if let Some(author) = obj.get("author") {
        match author {
            Value::Array(arr) => {
                for author_obj in arr {
                    push_author(author_obj, &mut authors);
                }
            }
            other => push_author(other, &mut authors),
        }
    }
    authors
}

fn push_author(value: &Value, authors: &mut Vec<String>) {
    let name = match value {
        Value::Object(obj) => obj.get("name").and_then(Value::as_str),
        Value::String(s) => Some(s.as_str()),
        _ => None,
    };
    if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
        authors.push(name.to_string());
    }
}

/// `image` may be a URL, an `ImageObject`, or a list of either.
fn extract_image(obj: &Value) -> Option<String> {
    fn url_of(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Object(o) => o.get("url").and_then(Value::as_str).map(|s| s.trim().to_string()),
            Value::Array(items) => items.iter().find_map(url_of),
            _ => None,
        }
    }
    obj.get("image").and_then(url_of).filter(|s| !s.is_empty())
}
