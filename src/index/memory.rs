//! In-memory embedding index implementation.
//!
//! Useful for testing and small datasets.

use super::{cosine_similarity, EmbeddingIndex, IndexedChunk, ScoredChunk};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory embedding index.
pub struct MemoryEmbeddingIndex {
    chunks: RwLock<HashMap<Uuid, IndexedChunk>>,
}

impl MemoryEmbeddingIndex {
    /// Create a new in-memory index.
    pub fn new() -> Self {
        Self {
            chunks: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryEmbeddingIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingIndex for MemoryEmbeddingIndex {
    async fn add(&self, chunks: &[IndexedChunk]) -> Result<usize> {
        let mut store = self.chunks.write().unwrap();
        for chunk in chunks {
            store.insert(chunk.id, chunk.clone());
        }
        Ok(chunks.len())
    }

    async fn delete(&self, video_id: &str) -> Result<usize> {
        let mut store = self.chunks.write().unwrap();
        let initial_len = store.len();
        store.retain(|_, chunk| chunk.video_id != video_id);
        Ok(initial_len - store.len())
    }

    async fn query(
        &self,
        video_id: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let store = self.chunks.read().unwrap();

        let mut results: Vec<ScoredChunk> = store
            .values()
            .filter(|chunk| chunk.video_id == video_id)
            .map(|chunk| ScoredChunk {
                score: cosine_similarity(query_embedding, &chunk.embedding),
                chunk: chunk.clone(),
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        Ok(results)
    }

    async fn count(&self, video_id: &str) -> Result<usize> {
        let store = self.chunks.read().unwrap();
        Ok(store.values().filter(|c| c.video_id == video_id).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::test_metadata;

    fn chunk(video_id: &str, text: &str, order: i32, embedding: Vec<f32>) -> IndexedChunk {
        IndexedChunk::new(
            video_id.to_string(),
            text.to_string(),
            order,
            embedding,
            test_metadata(),
        )
    }

    #[tokio::test]
    async fn test_add_query_delete_scoped_by_video() {
        let index = MemoryEmbeddingIndex::new();

        index
            .add(&[
                chunk("video1", "first", 0, vec![1.0, 0.0, 0.0]),
                chunk("video1", "second", 1, vec![0.0, 1.0, 0.0]),
                chunk("video2", "other", 0, vec![1.0, 0.0, 0.0]),
            ])
            .await
            .unwrap();

        assert_eq!(index.count("video1").await.unwrap(), 2);
        assert_eq!(index.count("video2").await.unwrap(), 1);

        let results = index.query("video1", &[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.text, "first");
        assert!(results[0].score > results[1].score);
        assert!(results.iter().all(|r| r.chunk.video_id == "video1"));

        let removed = index.delete("video1").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(index.count("video1").await.unwrap(), 0);
        assert_eq!(index.count("video2").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_query_respects_limit() {
        let index = MemoryEmbeddingIndex::new();

        let chunks: Vec<IndexedChunk> = (0..5)
            .map(|i| chunk("video1", &format!("chunk {}", i), i, vec![1.0, i as f32, 0.0]))
            .collect();
        index.add(&chunks).await.unwrap();

        let results = index.query("video1", &[1.0, 0.0, 0.0], 3).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_delete_missing_video_is_zero() {
        let index = MemoryEmbeddingIndex::new();
        assert_eq!(index.delete("missing").await.unwrap(), 0);
    }
}
