use serde::Serialize;

use super::Corpus;
use crate::document::preview;

/// Results returned by a search when the caller does not ask for a count
pub const DEFAULT_MAX_RESULTS: usize = 5;

const PREVIEW_CHARS: usize = 200;
const TITLE_WEIGHT: usize = 3;
const PHRASE_BONUS: usize = 5;

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "if", "then", "else", "when",
    "at", "from", "by", "for", "with", "about", "against", "between",
    "into", "through", "during", "before", "after", "above", "below",
    "to", "of", "in", "on", "is", "are", "was", "were", "be", "been",
    "being", "have", "has", "had", "do", "does", "did", "will", "would",
    "shall", "should", "can", "could", "may", "might", "must", "this",
    "that", "these", "those", "i", "you", "he", "she", "it", "we", "they",
    "how",
];

/// One ranked search match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub path: String,
    pub score: usize,
    pub preview: String,
}

/// Lowercased, deduplicated query terms.
///
/// Stopwords and single characters are dropped unless nothing else is left.
pub(crate) fn query_terms(query: &str) -> Vec<String> {
    let query = query.to_lowercase();
    let mut raw: Vec<String> = Vec::new();
    for word in query.split_whitespace() {
        if !raw.iter().any(|w| w == word) {
            raw.push(word.to_string());
        }
    }

    let keywords: Vec<String> = raw
        .iter()
        .filter(|word| word.chars().count() > 1 && !STOPWORDS.contains(&word.as_str()))
        .cloned()
        .collect();

    if keywords.is_empty() { raw } else { keywords }
}

impl Corpus {
    /// Rank sections by how often the query terms occur in their title and body
    pub fn search(&self, query: &str, max_results: usize) -> Vec<SearchHit> {
        let terms = query_terms(query);
        if terms.is_empty() || max_results == 0 {
            return Vec::new();
        }
        let phrase = query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();

        let mut scored: Vec<(usize, usize)> = self
            .sections
            .iter()
            .enumerate()
            .filter_map(|(idx, section)| {
                let title = section.title.to_lowercase();
                let body = section.body.to_lowercase();

                let mut score: usize = terms
                    .iter()
                    .map(|term| {
                        TITLE_WEIGHT * title.matches(term.as_str()).count()
                            + body.matches(term.as_str()).count()
                    })
                    .sum();
                if score > 0 && terms.len() > 1 && (title.contains(&phrase) || body.contains(&phrase)) {
                    score += PHRASE_BONUS;
                }

                (score > 0).then_some((idx, score))
            })
            .collect();

        // Stable sort keeps document order between equal scores
        scored.sort_by(|(_, a), (_, b)| b.cmp(a));

        scored
            .into_iter()
            .take(max_results)
            .map(|(idx, score)| {
                let section = &self.sections[idx];
                SearchHit {
                    title: section.title.clone(),
                    path: section.path.clone(),
                    score,
                    preview: preview(&section.body, PREVIEW_CHARS),
                }
            })
            .collect()
    }
}
