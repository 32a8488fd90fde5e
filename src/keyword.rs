//! Keyword extraction: reduce a free-text query to the single
//! highest-signal programming term drawn from a known vocabulary.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

/// Lower-cased programming terms, loaded once at startup from a flat
/// JSON array. Read-only for the life of the process.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    terms: HashSet<String>,
}

impl Vocabulary {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read vocabulary file {}", path.display()))?;
        let raw: Vec<String> = serde_json::from_str(&data).with_context(|| {
            format!(
                "Vocabulary file {} is not a JSON array of strings",
                path.display()
            )
        })?;
        Ok(Self::from_terms(raw))
    }

    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|t| t.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Closed-class English words that can never be the subject of a code
/// search. Dropping these leaves the noun-like tokens; the vocabulary
/// intersection then does the real filtering.
const STOP_WORDS: &[&str] = &[
    "a", "about", "all", "am", "an", "and", "another", "any", "are", "at", "be", "been",
    "being", "between", "but", "by", "can", "could", "did", "do", "does", "each", "else",
    "every", "find", "for", "from", "get", "give", "had", "has", "have", "how", "i", "if",
    "in", "into", "is", "it", "its", "may", "me", "might", "more", "most", "must", "my",
    "need", "needs", "no", "not", "of", "on", "or", "other", "our", "over", "please",
    "shall", "should", "show", "some", "that", "the", "then", "these", "this", "those",
    "to", "under", "want", "wants", "was", "we", "were", "what", "when", "where", "which",
    "who", "whom", "whose", "why", "will", "with", "without", "would", "yes", "you",
    "your",
];

/// Extract the most relevant vocabulary term from a query.
///
/// Tokens are filtered down to noun candidates (alphabetic, not a
/// closed-class word), lower-cased, and intersected with the
/// vocabulary. Occurrences are counted in a frequency table built in
/// first-seen order; the highest count wins and ties go to the term
/// seen first. That stable tie-break is the extractor's only
/// determinism guarantee and must hold across runs.
///
/// Returns `None` when no vocabulary term survives filtering — a
/// terminal "no relevant keyword" condition, not a retryable error.
pub fn extract_keyword(query: &str, vocabulary: &Vocabulary) -> Option<String> {
    let mut freq: Vec<(String, usize)> = Vec::new();

    for token in query.split(|c: char| !c.is_alphanumeric()) {
        if token.is_empty() || !token.chars().all(|c| c.is_alphabetic()) {
            continue;
        }
        let lower = token.to_lowercase();
        if STOP_WORDS.contains(&lower.as_str()) {
            continue;
        }
        if !vocabulary.contains(&lower) {
            continue;
        }
        match freq.iter_mut().find(|(term, _)| *term == lower) {
            Some((_, count)) => *count += 1,
            None => freq.push((lower, 1)),
        }
    }

    // Strictly-greater comparison: equal counts never displace the
    // earlier term.
    let mut best: Option<(usize, usize)> = None;
    for (i, (_, count)) in freq.iter().enumerate() {
        if best.map_or(true, |(_, best_count)| *count > best_count) {
            best = Some((i, *count));
        }
    }

    best.map(|(i, _)| freq[i].0.clone())
}
