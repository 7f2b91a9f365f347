//! Minimal RSS 2.0 / Atom reader built on `quick-xml`.
//!
//! Only the fields discovery needs are kept: title, link and summary. Both
//! `<item>` (RSS) and `<entry>` (Atom) elements are recognised. Summaries are
//! HTML in most feeds and are reduced to plain text.

use crate::utils::collapse_whitespace;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use scraper::Html;

/// One feed entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub summary: String,
}

impl FeedEntry {
    /// Case-insensitive substring match against title or summary.
    pub fn mentions(&self, keyword_lower: &str) -> bool {
        self.title.to_lowercase().contains(keyword_lower)
            || self.summary.to_lowercase().contains(keyword_lower)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Summary,
}

/// Parse feed XML into entries, in document order.
///
/// Only direct children of an `<item>`/`<entry>` are read as its fields, so
/// nested elements such as an Atom `<source><title>` cannot overwrite the
/// entry's own title. Markup inside a field (an xhtml `<summary><div>`) is
/// flattened into the field's text.
///
/// # Errors
///
/// Returns the parser's message when the document is not well-formed XML or
/// contains no `<rss>`, `<feed>` or `<rdf:RDF>` root.
pub fn parse_feed(xml: &[u8]) -> Result<Vec<FeedEntry>, String> {
    let mut reader = Reader::from_reader(xml);

    let mut buf = Vec::new();
    let mut entries = Vec::new();
    let mut current: Option<FeedEntry> = None;
    // Element depth below the open entry; direct children sit at 1.
    let mut depth = 0usize;
    let mut field: Option<Field> = None;
    let mut text = String::new();
    let mut saw_root = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.name();
                match name.as_ref() {
                    b"rss" | b"feed" | b"rdf:RDF" => saw_root = true,
                    b"item" | b"entry" if current.is_none() => {
                        current = Some(FeedEntry::default());
                        depth = 0;
                        field = None;
                    }
                    _ if current.is_some() => {
                        depth += 1;
                        if depth == 1 {
                            field = field_for(name.as_ref());
                            text.clear();
                            if field == Some(Field::Link) {
                                if let (Some(entry), Some(href)) = (current.as_mut(), atom_href(&e)) {
                                    entry.link = href;
                                }
                            }
                        } else if field.is_some() {
                            text.push(' ');
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                if depth == 0 && e.name().as_ref() == b"link" {
                    if let (Some(entry), Some(href)) = (current.as_mut(), atom_href(&e)) {
                        if entry.link.is_empty() {
                            entry.link = href;
                        }
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if field.is_some() {
                    let raw = String::from_utf8_lossy(&t);
                    match quick_xml::escape::unescape(&raw) {
                        Ok(unescaped) => text.push_str(&unescaped),
                        Err(_) => text.push_str(&raw),
                    }
                }
            }
            Ok(Event::CData(c)) => {
                if field.is_some() {
                    text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Ok(Event::GeneralRef(r)) => {
                if field.is_some() {
                    let entity = format!("&{};", String::from_utf8_lossy(&r));
                    match quick_xml::escape::unescape(&entity) {
                        Ok(resolved) => text.push_str(&resolved),
                        Err(_) => text.push_str(&entity),
                    }
                }
            }
            Ok(Event::End(e)) => {
                if current.is_some() && depth == 0 {
                    if matches!(e.name().as_ref(), b"item" | b"entry") {
                        if let Some(entry) = current.take() {
                            entries.push(entry);
                        }
                        field = None;
                    }
                } else if current.is_some() {
                    if depth == 1 {
                        if let (Some(f), Some(entry)) = (field.take(), current.as_mut()) {
                            store(entry, f, &text);
                        }
                        text.clear();
                    }
                    depth -= 1;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "XML error at position {}: {}",
                    reader.error_position(),
                    e
                ));
            }
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err("document is not an RSS or Atom feed".to_string());
    }
    Ok(entries)
}

fn field_for(name: &[u8]) -> Option<Field> {
    match name {
        b"title" => Some(Field::Title),
        b"link" => Some(Field::Link),
        b"description" | b"summary" => Some(Field::Summary),
        _ => None,
    }
}

fn store(entry: &mut FeedEntry, field: Field, text: &str) {
    match field {
        Field::Title => entry.title = collapse_whitespace(text),
        // Atom links arrive via the href attribute; RSS links as text.
        Field::Link => {
            let link = text.trim();
            if !link.is_empty() {
                entry.link = link.to_string();
            }
        }
        Field::Summary => {
            if entry.summary.is_empty() {
                entry.summary = strip_markup(text);
            }
        }
    }
}

/// `href` of an Atom `<link>`, ignoring non-alternate relations.
fn atom_href(e: &BytesStart<'_>) -> Option<String> {
    let mut href = None;
    let mut rel_ok = true;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"href" => href = Some(String::from_utf8_lossy(&attr.value).trim().to_string()),
            b"rel" => rel_ok = attr.value.as_ref() == b"alternate",
            _ => {}
        }
    }
    href.filter(|h| rel_ok && !h.is_empty())
}

fn strip_markup(html: &str) -> String {
    if !html.contains('<') {
        return collapse_whitespace(html);
    }
    let fragment = Html::parse_fragment(html);
    collapse_whitespace(&fragment.root_element().text().collect::<Vec<_>>().join(" "))
}
