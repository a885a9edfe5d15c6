// Russian Snowball stemming and stem-level deduplication.
//
// Uses the rust-stemmers port of the Snowball russian algorithm. Snowball
// expects lowercase input, so every word is lowercased before stemming.
// Multi-word phrases (ngram > 1) are stemmed word by word and rejoined,
// which groups inflected variants of a phrase the same way single words are
// grouped.

use rust_stemmers::{Algorithm, Stemmer};

use crate::keywords::ScoredPhrase;

/// A deduplicated extraction result: the stem plus the score of the
/// highest-ranked phrase that produced it.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ScoredStem(pub String, pub f32);

/// Snowball stemmer for Russian. Construction is infallible and cheap —
/// the algorithm is compiled in, there is nothing to load from disk.
pub struct RussianStemmer {
    inner: Stemmer,
}

impl Default for RussianStemmer {
    fn default() -> Self {
        Self::new()
    }
}

impl RussianStemmer {
    pub fn new() -> Self {
        Self {
            inner: Stemmer::create(Algorithm::Russian),
        }
    }

    /// Reduce a word or phrase to its stem form.
    pub fn stem(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|word| self.inner.stem(&word.to_lowercase()).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Deduplicate scored phrases by stem, keeping the first (highest-scored)
/// occurrence of each stem.
///
/// Candidates must already be in descending-score order — this walks them
/// in place and never re-sorts, so ties keep the extractor's native
/// ordering. Stops once `top_n` unique stems are emitted or the candidate
/// pool is exhausted; fewer than `top_n` results is accepted, not retried.
pub fn dedup_by_stem(
    candidates: &[ScoredPhrase],
    stemmer: &RussianStemmer,
    top_n: usize,
) -> Vec<ScoredStem> {
    let mut seen = std::collections::HashSet::new();
    let mut results = Vec::new();

    for candidate in candidates {
        let stem = stemmer.stem(&candidate.phrase);
        if seen.insert(stem.clone()) {
            results.push(ScoredStem(stem, candidate.score));
        }
        if results.len() >= top_n {
            break;
        }
    }

    results
}
