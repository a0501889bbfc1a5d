//! Keyword extraction from task descriptions.
//!
//! [`KeywordExtractor`] is the seam; [`IdentifierKeywords`] is the default
//! rule. It favors identifier-like tokens (`CustomSupabaseProvider`,
//! `parse_log`, `src/main.rs`), which are kept verbatim and also broken into
//! their lower-cased parts, and keeps ordinary words only when they are long
//! enough and not stopwords.

use std::collections::HashSet;

/// Default minimum length for plain words.
pub const DEFAULT_MIN_LEN: usize = 3;
/// Default cap on the number of keywords.
pub const DEFAULT_MAX_KEYWORDS: usize = 12;

/// Built-in stopwords: common English function words and generic task verbs.
const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "before", "but", "by", "can", "could", "do", "does", "for", "from", "get", "has", "have",
    "how", "if", "in", "into", "is", "it", "its", "just", "make", "more", "need", "needs",
    "not", "of", "on", "or", "our", "should", "so", "some", "than", "that", "the", "their",
    "them", "then", "there", "these", "this", "those", "to", "too", "up", "was", "we", "were",
    "what", "when", "where", "which", "while", "will", "with", "would", "you", "your",
    // Generic task verbs carry no signal about what to look at.
    "add", "change", "create", "fix", "implement", "improve", "remove", "update",
];

/// Derives keywords from a task description.
pub trait KeywordExtractor: Send + Sync {
    fn extract(&self, task: &str) -> Vec<String>;
}

/// Identifier-aware keyword rule.
#[derive(Debug, Clone)]
pub struct IdentifierKeywords {
    min_len: usize,
    max_keywords: usize,
    stopwords: HashSet<String>,
}

impl Default for IdentifierKeywords {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_LEN, DEFAULT_MAX_KEYWORDS)
    }
}

impl IdentifierKeywords {
    pub fn new(min_len: usize, max_keywords: usize) -> Self {
        Self {
            min_len: min_len.max(1),
            max_keywords,
            stopwords: STOPWORDS.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Add stopwords on top of the built-in list (matched case-insensitively).
    pub fn with_stopwords<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stopwords
            .extend(extra.into_iter().map(|s| s.as_ref().trim().to_lowercase()));
        self
    }

    fn is_meaningful(&self, word: &str) -> bool {
        word.chars().count() >= self.min_len
            && !word.chars().all(|c| c.is_ascii_digit())
            && !self.stopwords.contains(&word.to_lowercase())
    }
}

impl KeywordExtractor for IdentifierKeywords {
    fn extract(&self, task: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut keywords = Vec::new();
        let mut push = |word: String, keywords: &mut Vec<String>| {
            if seen.insert(word.to_lowercase()) {
                keywords.push(word);
            }
        };

        for raw in task.split(|c: char| !(c.is_alphanumeric() || is_joiner(c))) {
            let token = raw.trim_matches(|c: char| !c.is_alphanumeric());
            if token.is_empty() {
                continue;
            }

            if is_identifier_like(token) {
                if !self.stopwords.contains(&token.to_lowercase()) {
                    push(token.to_string(), &mut keywords);
                }
                for part in split_identifier(token) {
                    if self.is_meaningful(&part) {
                        push(part, &mut keywords);
                    }
                }
            } else if self.is_meaningful(token) {
                push(token.to_lowercase(), &mut keywords);
            }

            if keywords.len() >= self.max_keywords {
                break;
            }
        }

        keywords.truncate(self.max_keywords);
        keywords
    }
}

fn is_joiner(c: char) -> bool {
    matches!(c, '_' | '-' | '.' | '/')
}

/// Whether a token looks like a code identifier, path, or acronym rather
/// than a plain word.
pub fn is_identifier_like(token: &str) -> bool {
    let has_lower = token.chars().any(char::is_lowercase);
    let has_alpha = token.chars().any(char::is_alphabetic);
    let inner_upper = token.chars().skip(1).any(char::is_uppercase);
    let all_caps = has_alpha && !has_lower && token.chars().count() >= 2;

    token.chars().any(is_joiner)
        || (has_alpha && token.chars().any(|c| c.is_ascii_digit()))
        || (inner_upper && has_lower)
        || all_caps
}

/// Split an identifier into lower-cased parts on `_ - . /` and CamelCase
/// boundaries (`HTTPServer` → `http`, `server`).
pub fn split_identifier(token: &str) -> Vec<String> {
    let mut parts = Vec::new();
    for segment in token.split(is_joiner) {
        let chars: Vec<char> = segment.chars().collect();
        let mut current = String::new();
        for (i, &c) in chars.iter().enumerate() {
            if i > 0 && c.is_uppercase() {
                let prev = chars[i - 1];
                let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
                let boundary = prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next_lower);
                if boundary && !current.is_empty() {
                    parts.push(std::mem::take(&mut current).to_lowercase());
                }
            }
            current.push(c);
        }
        if !current.is_empty() {
            parts.push(current.to_lowercase());
        }
    }
    parts
}
