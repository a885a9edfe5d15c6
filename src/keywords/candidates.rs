// Candidate phrase generation for keyphrase ranking.
//
// Mirrors the CountVectorizer convention: lowercase the document, tokenize
// into word characters, drop stop words from the token stream, then build
// n-grams over the remaining sequence. Candidates keep first-occurrence
// order, which is what breaks score ties downstream.

use std::collections::HashSet;

/// Split a document into lowercase word tokens. A token is a maximal run of
/// alphanumeric characters (Cyrillic included — `is_alphanumeric` is
/// Unicode-aware).
pub fn tokenize(doc: &str) -> Vec<String> {
    doc.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

/// Generate unique candidate n-grams for every length in
/// `min_ngram..=max_ngram`, in first-occurrence order.
///
/// Callers validate `min_ngram <= max_ngram` before this runs. An empty
/// document simply yields no candidates.
pub fn generate(
    doc: &str,
    min_ngram: usize,
    max_ngram: usize,
    stop_words: &HashSet<String>,
) -> Vec<String> {
    let tokens: Vec<String> = tokenize(doc)
        .into_iter()
        .filter(|t| !stop_words.contains(t))
        .collect();

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for n in min_ngram..=max_ngram {
        if n == 0 || n > tokens.len() {
            continue;
        }
        for window in tokens.windows(n) {
            let phrase = window.join(" ");
            if seen.insert(phrase.clone()) {
                candidates.push(phrase);
            }
        }
    }

    candidates
}
