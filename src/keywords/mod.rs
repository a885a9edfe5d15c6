// Embedding-based keyphrase extraction.
//
// KeyBERT-style ranking: embed the whole document and every candidate
// n-gram with the same sentence encoder, then score each candidate by
// cosine similarity to the document vector. Higher score = more relevant.
//
// The trait boundary exists so the HTTP layer can be exercised in tests
// with a stub extractor — loading a multi-hundred-MB SBERT model in CI is
// not reasonable.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::embedding::SentenceEmbedder;

pub mod candidates;

/// A candidate phrase with its relevance score (cosine similarity to the
/// document embedding, 0.0 to 1.0).
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPhrase {
    pub phrase: String,
    pub score: f32,
}

/// Trait for ranking candidate phrases of a document by relevance.
///
/// Implementations must return results in descending-score order; ties
/// keep candidate-generation order (callers never re-sort).
#[async_trait]
pub trait KeyphraseExtractor: Send + Sync {
    /// Rank candidate phrases of `doc` with n-gram lengths in
    /// `ngram_range` (inclusive bounds), returning at most `top_n`.
    async fn extract(
        &self,
        doc: &str,
        ngram_range: (usize, usize),
        top_n: usize,
    ) -> Result<Vec<ScoredPhrase>>;
}

/// The production extractor: candidate generation + SBERT embeddings.
pub struct EmbeddingKeyphraseExtractor {
    embedder: Arc<SentenceEmbedder>,
    stop_words: HashSet<String>,
}

impl EmbeddingKeyphraseExtractor {
    /// Build an extractor over an already-loaded embedder, with the
    /// Russian stop word list from the stop-words crate.
    pub fn new(embedder: Arc<SentenceEmbedder>) -> Self {
        let stop_words: HashSet<String> = stop_words::get(stop_words::LANGUAGE::Russian)
            .into_iter()
            .collect();
        Self {
            embedder,
            stop_words,
        }
    }
}

#[async_trait]
impl KeyphraseExtractor for EmbeddingKeyphraseExtractor {
    async fn extract(
        &self,
        doc: &str,
        ngram_range: (usize, usize),
        top_n: usize,
    ) -> Result<Vec<ScoredPhrase>> {
        let (min_ngram, max_ngram) = ngram_range;
        let phrases = candidates::generate(doc, min_ngram, max_ngram, &self.stop_words);

        if phrases.is_empty() {
            debug!(doc_len = doc.len(), "No candidate phrases in document");
            return Ok(Vec::new());
        }

        // One batch: the document itself first, then every candidate.
        let mut batch = Vec::with_capacity(phrases.len() + 1);
        batch.push(doc.to_string());
        batch.extend(phrases.iter().cloned());

        let embeddings = self.embedder.embed_batch(&batch).await?;
        let doc_embedding = &embeddings[0];

        let mut scored: Vec<ScoredPhrase> = phrases
            .into_iter()
            .zip(embeddings[1..].iter())
            .map(|(phrase, emb)| ScoredPhrase {
                score: cosine_similarity(doc_embedding, emb),
                phrase,
            })
            .collect();

        // Stable sort keeps candidate-generation order on ties
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_n);

        debug!(
            candidates = scored.len(),
            top_n = top_n,
            "Ranked keyphrase candidates"
        );

        Ok(scored)
    }
}

/// Cosine similarity between two embedding vectors, clamped to 0.0..=1.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    let denom = mag_a * mag_b;
    if denom < f32::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical() {
        let a = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&a, &a);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_proportional() {
        // Same direction, different magnitudes — should be 1.0
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![2.0, 4.0, 6.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite_clamps_to_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < f32::EPSILON);
    }

    #[test]
    fn test_cosine_zero_vector() {
        let a = vec![0.0, 0.0, 0.0];
        let b = vec![1.0, 2.0, 3.0];
        assert!(cosine_similarity(&a, &b).abs() < f32::EPSILON);
    }

    #[test]
    fn test_cosine_mismatched_dimensions() {
        let a = vec![1.0, 2.0];
        let b = vec![1.0, 2.0, 3.0];
        assert!(cosine_similarity(&a, &b).abs() < f32::EPSILON);
    }

    #[test]
    fn test_cosine_is_symmetric() {
        let a = vec![1.0, 3.0, -2.0, 0.5];
        let b = vec![2.0, -1.0, 4.0, 0.0];
        let sim_ab = cosine_similarity(&a, &b);
        let sim_ba = cosine_similarity(&b, &a);
        assert!((sim_ab - sim_ba).abs() < 1e-6);
    }
}
