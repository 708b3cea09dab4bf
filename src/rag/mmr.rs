//! Maximal marginal relevance selection.
//!
//! Plain nearest-neighbor retrieval over a transcript index tends to return
//! near-duplicate passages (the same point restated across adjacent chunks).
//! MMR trades a little relevance for mutual dissimilarity:
//!
//! MMR = lambda * sim(query, candidate) - (1 - lambda) * max sim(candidate, selected)
//!
//! lambda = 1.0 is pure relevance, 0.0 pure diversity.

use crate::index::{cosine_similarity, ScoredChunk};

/// Select up to `k` chunks from the candidate pool, balancing query relevance
/// against similarity to already-selected chunks.
///
/// Candidates are expected sorted by relevance descending (the index's query
/// order); the output is in selection order.
pub fn mmr_select(
    query_embedding: &[f32],
    mut pool: Vec<ScoredChunk>,
    k: usize,
    lambda: f32,
) -> Vec<ScoredChunk> {
    let lambda = lambda.clamp(0.0, 1.0);
    let k = k.min(pool.len());
    let mut selected: Vec<ScoredChunk> = Vec::with_capacity(k);

    while selected.len() < k && !pool.is_empty() {
        let mut best_idx = 0;
        let mut best_score = f32::NEG_INFINITY;

        for (idx, candidate) in pool.iter().enumerate() {
            let relevance = cosine_similarity(query_embedding, &candidate.chunk.embedding);

            let redundancy = selected
                .iter()
                .map(|s| cosine_similarity(&candidate.chunk.embedding, &s.chunk.embedding))
                .fold(0.0f32, f32::max);

            let score = lambda * relevance - (1.0 - lambda) * redundancy;
            if score > best_score {
                best_score = score;
                best_idx = idx;
            }
        }

        selected.push(pool.remove(best_idx));
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{test_metadata, IndexedChunk};

    fn candidate(text: &str, score: f32, embedding: Vec<f32>) -> ScoredChunk {
        ScoredChunk {
            chunk: IndexedChunk::new(
                "video1".to_string(),
                text.to_string(),
                0,
                embedding,
                test_metadata(),
            ),
            score,
        }
    }

    #[test]
    fn test_empty_pool() {
        let selected = mmr_select(&[1.0, 0.0], Vec::new(), 5, 0.4);
        assert!(selected.is_empty());
    }

    #[test]
    fn test_k_zero() {
        let pool = vec![candidate("a", 0.9, vec![1.0, 0.0])];
        assert!(mmr_select(&[1.0, 0.0], pool, 0, 0.4).is_empty());
    }

    #[test]
    fn test_returns_k_results() {
        let pool = vec![
            candidate("a", 0.9, vec![0.9, 0.1, 0.0]),
            candidate("b", 0.8, vec![0.8, 0.2, 0.0]),
            candidate("c", 0.7, vec![0.7, 0.3, 0.0]),
            candidate("d", 0.6, vec![0.6, 0.4, 0.0]),
        ];

        let selected = mmr_select(&[1.0, 0.0, 0.0], pool, 3, 0.5);
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_k_larger_than_pool() {
        let pool = vec![candidate("only", 0.9, vec![1.0, 0.0])];
        let selected = mmr_select(&[1.0, 0.0], pool, 10, 0.5);
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn test_pure_relevance_preserves_order() {
        let pool = vec![
            candidate("best", 0.9, vec![0.9, 0.1]),
            candidate("close", 0.85, vec![0.88, 0.12]),
            candidate("far", 0.5, vec![0.5, 0.5]),
        ];

        let selected = mmr_select(&[1.0, 0.0], pool, 3, 1.0);
        assert_eq!(selected[0].chunk.text, "best");
        assert_eq!(selected[1].chunk.text, "close");
    }

    #[test]
    fn test_promotes_diversity_over_near_duplicates() {
        let pool = vec![
            candidate("top", 0.95, vec![0.99, 0.01, 0.0]),
            candidate("duplicate", 0.94, vec![0.98, 0.02, 0.0]),
            candidate("different", 0.7, vec![0.0, 0.0, 1.0]),
        ];

        let selected = mmr_select(&[1.0, 0.0, 0.0], pool, 2, 0.5);

        assert_eq!(selected[0].chunk.text, "top");
        assert_eq!(
            selected[1].chunk.text, "different",
            "expected the dissimilar passage over the near-duplicate"
        );
    }

    #[test]
    fn test_identical_vectors_still_fill_k() {
        let pool = vec![
            candidate("a", 0.9, vec![1.0, 0.0]),
            candidate("b", 0.8, vec![1.0, 0.0]),
            candidate("c", 0.7, vec![1.0, 0.0]),
        ];

        let selected = mmr_select(&[1.0, 0.0], pool, 3, 0.5);
        assert_eq!(selected.len(), 3);
    }
}
