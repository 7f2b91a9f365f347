//! Extractive summarizer.
//!
//! Splits the body into sentences and scores each one on four features:
//! overlap with the title, density of the article's most frequent keywords,
//! closeness to an ideal length, and position in the article. The best
//! `max_sentences` are returned in their original order.
//!
//! Tokenizer and stopword resources live in a process-wide [`Lazy`]. The
//! first caller builds them and concurrent first callers block on that one
//! initialization. [`warm_up`] lets the binary pay that cost before the
//! first article.

use crate::error::ExtractionError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Sentences per summary when the caller does not say otherwise.
pub const DEFAULT_SENTENCES: usize = 5;

/// Sentence length (in words) that scores highest.
const IDEAL_LENGTH: f64 = 20.0;

/// Keywords considered when scoring frequency.
const TOP_KEYWORDS: usize = 10;

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of",
    "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own",
    "said", "same", "says", "she", "should", "so", "some", "such", "than", "that", "the", "their",
    "theirs", "them", "themselves", "then", "there", "these", "they", "this", "those", "through",
    "to", "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where",
    "which", "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours",
    "yourself", "yourselves",
];

/// Abbreviations whose trailing period does not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sen", "rep", "gov", "pres", "gen", "col", "lt", "sgt",
    "capt", "maj", "atty", "engr", "hon", "sr", "jr", "st", "vs", "etc", "inc", "corp",
    "co", "ltd", "jan", "feb", "mar", "apr", "aug", "sept", "sep", "oct", "nov", "dec", "u.s",
    "a.m", "p.m", "e.g", "i.e",
];

/// Abbreviations only when a number follows: `"No. 5"`, `"Nos. 3 and 4"`.
const NUMBER_ABBREVIATIONS: &[&str] = &["no", "nos"];

struct NlpResources {
    stopwords: HashSet<&'static str>,
    abbreviations: HashSet<&'static str>,
    word: Regex,
}

impl NlpResources {
    fn load() -> Result<Self, String> {
        Ok(Self {
            stopwords: STOPWORDS.iter().copied().collect(),
            abbreviations: ABBREVIATIONS.iter().copied().collect(),
            word: Regex::new(r"[\p{L}\p{N}']+").map_err(|e| e.to_string())?,
        })
    }

    fn words(&self, text: &str) -> Vec<String> {
        self.word
            .find_iter(text)
            .map(|m| m.as_str().trim_matches('\'').to_lowercase())
            .filter(|w| !w.is_empty())
            .collect()
    }

    fn content_words(&self, text: &str) -> Vec<String> {
        self.words(text)
            .into_iter()
            .filter(|w| !self.stopwords.contains(w.as_str()))
            .collect()
    }
}

static NLP: Lazy<Result<NlpResources, String>> = Lazy::new(NlpResources::load);

fn resources() -> Result<&'static NlpResources, ExtractionError> {
    NLP.as_ref()
        .map_err(|e| ExtractionError::Summarizer(e.clone()))
}

/// Initialize the shared NLP resources. Safe to call any number of times.
pub fn warm_up() -> Result<(), ExtractionError> {
    resources().map(|_| ())
}

/// Pick up to `max_sentences` representative sentences from `text`.
///
/// Returns an empty list when the text has no sentences.
pub fn summarize(
    title: &str,
    text: &str,
    max_sentences: usize,
) -> Result<Vec<String>, ExtractionError> {
    let nlp = resources()?;
    let sentences = split_sentences(nlp, text);
    if sentences.is_empty() || max_sentences == 0 {
        return Ok(Vec::new());
    }

    let keywords = keyword_scores(nlp, text);
    let title_words: HashSet<String> = nlp.content_words(title).into_iter().collect();
    let total = sentences.len();

    let mut scored: Vec<(usize, f64)> = sentences
        .iter()
        .enumerate()
        .map(|(i, s)| (i, score(nlp, s, i, total, &title_words, &keywords)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut chosen: Vec<usize> = scored.iter().take(max_sentences).map(|(i, _)| *i).collect();
    chosen.sort_unstable();
    Ok(chosen.into_iter().map(|i| sentences[i].clone()).collect())
}

fn score(
    nlp: &NlpResources,
    sentence: &str,
    index: usize,
    total: usize,
    title_words: &HashSet<String>,
    keywords: &HashMap<String, f64>,
) -> f64 {
    let words = nlp.words(sentence);
    if words.is_empty() {
        return 0.0;
    }

    let title = if title_words.is_empty() {
        0.0
    } else {
        let hits = words.iter().filter(|w| title_words.contains(*w)).count();
        (hits as f64 / title_words.len() as f64).min(1.0)
    };

    let frequency =
        words.iter().filter_map(|w| keywords.get(w)).sum::<f64>() / words.len() as f64;

    let length = (1.0 - (IDEAL_LENGTH - words.len() as f64).abs() / IDEAL_LENGTH).max(0.0);

    let position = position_score(index, total);

    (title * 1.5 + frequency * 2.0 + length + position) / 4.0
}

/// Opening and closing sentences carry the most weight in news writing.
fn position_score(index: usize, total: usize) -> f64 {
    let normalized = (index + 1) as f64 / total as f64;
    match normalized {
        n if n <= 0.1 => 0.17,
        n if n <= 0.2 => 0.23,
        n if n <= 0.3 => 0.14,
        n if n <= 0.4 => 0.08,
        n if n <= 0.5 => 0.05,
        n if n <= 0.9 => 0.04,
        _ => 0.15,
    }
}

/// Top keywords with scores normalized to the most frequent one.
fn keyword_scores(nlp: &NlpResources, text: &str) -> HashMap<String, f64> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for word in nlp.content_words(text) {
        if word.chars().count() > 1 {
            *counts.entry(word).or_default() += 1;
        }
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(TOP_KEYWORDS);

    let max = ranked.first().map(|(_, c)| *c).unwrap_or(1) as f64;
    ranked
        .into_iter()
        .map(|(word, count)| (word, count as f64 / max))
        .collect()
}

/// Split text into sentences. Paragraph breaks always end a sentence.
fn split_sentences(nlp: &NlpResources, text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    for paragraph in text.split("\n\n") {
        let chars: Vec<char> = paragraph.chars().collect();
        let mut start = 0;
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if matches!(c, '.' | '!' | '?') {
                // Swallow closing quotes and brackets after the terminator.
                let mut end = i + 1;
                while end < chars.len() && matches!(chars[end], '"' | '\'' | '”' | '’' | ')') {
                    end += 1;
                }
                let at_end = end >= chars.len();
                let boundary = at_end
                    || (chars[end].is_whitespace() && starts_sentence(&chars[end..]));
                if boundary && !(c == '.' && is_abbreviation(nlp, &chars[start..i], &chars[end..])) {
                    push_sentence(&mut sentences, &chars[start..end]);
                    start = end;
                }
                i = end;
            } else {
                i += 1;
            }
        }
        push_sentence(&mut sentences, &chars[start..]);
    }
    sentences
}

fn starts_sentence(rest: &[char]) -> bool {
    rest.iter()
        .find(|c| !c.is_whitespace())
        .is_some_and(|&c| c.is_uppercase() || c.is_numeric() || matches!(c, '"' | '“' | '\''))
}

/// Whether the word just before a period is an abbreviation or an initial.
fn is_abbreviation(nlp: &NlpResources, before: &[char], after: &[char]) -> bool {
    let word: String = before
        .iter()
        .rev()
        .take_while(|c| !c.is_whitespace() && **c != '(')
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    let lower = word.to_lowercase();
    let single_initial = word.chars().count() == 1 && word.chars().all(char::is_uppercase);
    let numbered = NUMBER_ABBREVIATIONS.contains(&lower.as_str())
        && after
            .iter()
            .find(|c| !c.is_whitespace())
            .is_some_and(|c| c.is_ascii_digit());
    single_initial || numbered || nlp.abbreviations.contains(lower.as_str())
}

fn push_sentence(sentences: &mut Vec<String>, chars: &[char]) {
    let sentence: String = chars.iter().collect();
    let sentence = sentence.split_whitespace().collect::<Vec<_>>().join(" ");
    if !sentence.is_empty() {
        sentences.push(sentence);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "Headline inflation eased to 2.1 percent in May, the Philippine Statistics Authority said. \
        Food inflation slowed as rice prices fell for a third straight month. \
        Sen. Juan Dela Cruz welcomed the data. \
        Economists expect the central bank to cut rates as inflation stays within target.\n\n\
        Transport costs rose slightly. \
        The next inflation report is due in early July.";

    fn nlp() -> &'static NlpResources {
        resources().unwrap()
    }

    #[test]
    fn test_warm_up_is_idempotent() {
        assert!(warm_up().is_ok());
        assert!(warm_up().is_ok());
    }

    #[test]
    fn test_split_respects_abbreviations() {
        let sentences = split_sentences(nlp(), BODY);
        assert_eq!(sentences.len(), 6);
        assert_eq!(sentences[2], "Sen. Juan Dela Cruz welcomed the data.");
        assert_eq!(sentences[4], "Transport costs rose slightly.");
    }

    #[test]
    fn test_no_is_an_abbreviation_only_before_a_number() {
        assert_eq!(
            split_sentences(nlp(), "The court said no. The Senate will appeal."),
            vec!["The court said no.", "The Senate will appeal."]
        );
        assert_eq!(
            split_sentences(nlp(), "Signal No. 3 was raised over Catanduanes. Classes were suspended."),
            vec!["Signal No. 3 was raised over Catanduanes.", "Classes were suspended."]
        );
    }

    #[test]
    fn test_split_keeps_decimals_and_initials() {
        let sentences = split_sentences(nlp(), "GDP grew 5.7 percent. Ferdinand R. Marcos Jr. spoke today.");
        assert_eq!(
            sentences,
            vec!["GDP grew 5.7 percent.", "Ferdinand R. Marcos Jr. spoke today."]
        );
    }

    #[test]
    fn test_summary_is_in_original_order_and_bounded() {
        let summary = summarize("Inflation eases in May", BODY, 3).unwrap();
        assert_eq!(summary.len(), 3);
        let sentences = split_sentences(nlp(), BODY);
        let positions: Vec<usize> = summary
            .iter()
            .map(|s| sentences.iter().position(|x| x == s).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(summary[0], sentences[0]);
    }

    #[test]
    fn test_summary_of_short_text() {
        let summary = summarize("x", "Only one sentence here.", DEFAULT_SENTENCES).unwrap();
        assert_eq!(summary, vec!["Only one sentence here."]);
    }

    #[test]
    fn test_empty_text() {
        assert!(summarize("Title", "   ", 5).unwrap().is_empty());
    }
}
