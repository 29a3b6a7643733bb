//! Search keyword extraction from free-form descriptions.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;

use yukti_content::{SamplingParams, TextModel};

/// Most keywords ever returned.
pub const MAX_KEYWORDS: usize = 10;

const MAX_BIGRAMS: usize = 5;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-zA-Z]{3,}").expect("valid regex"));

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "your", "you", "are", "our", "have",
    "will", "can", "not", "but", "about", "product", "service", "use", "using", "get", "gets",
    "a", "an", "in", "on", "of", "to", "is", "it", "as", "at", "by",
];

#[async_trait]
pub trait KeywordExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Vec<String>;
}

/// Word and adjacent-pair frequency counting.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrequencyExtractor;

impl FrequencyExtractor {
    /// Top words by frequency, then the most frequent adjacent pairs not
    /// already present, capped at [`MAX_KEYWORDS`]. Ties keep first-seen order.
    #[must_use]
    pub fn extract_sync(text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = WORD
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|w| !STOPWORDS.contains(w))
            .collect();
        if words.is_empty() {
            return Vec::new();
        }

        let mut keywords = most_common(words.iter().map(|w| (*w).to_string()), MAX_KEYWORDS);

        let bigrams = words.windows(2).map(|pair| format!("{} {}", pair[0], pair[1]));
        for bigram in most_common(bigrams, MAX_BIGRAMS) {
            if keywords.len() >= MAX_KEYWORDS {
                break;
            }
            if !keywords.contains(&bigram) {
                keywords.push(bigram);
            }
        }
        keywords
    }
}

/// The `limit` most frequent items, ties broken by first occurrence.
fn most_common(items: impl Iterator<Item = String>, limit: usize) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for item in items {
        let count = counts.entry(item.clone()).or_insert(0);
        if *count == 0 {
            order.push(item);
        }
        *count += 1;
    }
    // Stable sort keeps first-seen order among equal counts.
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.truncate(limit);
    order
}

#[async_trait]
impl KeywordExtractor for FrequencyExtractor {
    async fn extract(&self, text: &str) -> Vec<String> {
        Self::extract_sync(text)
    }
}

/// Asks a language model for noun phrases and named entities.
///
/// Falls back to [`FrequencyExtractor`] when the model fails or returns nothing usable.
pub struct ModelExtractor {
    model: Arc<dyn TextModel>,
}

impl ModelExtractor {
    #[must_use]
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    fn prompt(text: &str) -> String {
        format!(
            "\n\nHuman: List the noun phrases and named entities in the following campaign \
             description, one per line, with no numbering or commentary.\n\n{text}\n\nAssistant:"
        )
    }
}

/// One phrase per line; bullets stripped, entries of two characters or fewer
/// dropped, duplicates removed case-insensitively.
fn parse_phrases(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.replace("Assistant:", "")
        .lines()
        .map(|line| line.trim().trim_start_matches(['-', '*', '•']).trim())
        .filter(|phrase| phrase.chars().count() > 2)
        .filter(|phrase| seen.insert(phrase.to_lowercase()))
        .map(str::to_owned)
        .collect()
}

#[async_trait]
impl KeywordExtractor for ModelExtractor {
    async fn extract(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let params = SamplingParams {
            max_tokens: 300,
            ..SamplingParams::default()
        };
        match self.model.complete(&Self::prompt(text), &params).await {
            Ok(raw) => {
                let phrases = parse_phrases(&raw);
                if phrases.is_empty() {
                    tracing::warn!("model returned no keywords, using frequency extraction");
                    FrequencyExtractor::extract_sync(text)
                } else {
                    phrases
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "keyword model failed, using frequency extraction");
                FrequencyExtractor::extract_sync(text)
            }
        }
    }
}
