//! Per-video embedding index abstraction.
//!
//! The index owns every chunk for a video id. Ingestion replaces a video's
//! chunk set wholesale (delete-then-add); retrieval queries are always scoped
//! to one video id.

mod memory;
mod sqlite;

pub use memory::MemoryEmbeddingIndex;
pub use sqlite::SqliteEmbeddingIndex;

use crate::error::Result;
use crate::transcript::TranscriptSource;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Descriptive metadata shared by every chunk of one ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Source type of the content (e.g. "youtube").
    pub source: String,
    /// Video title.
    pub title: String,
    /// Video description.
    pub description: Option<String>,
    /// Channel/author name.
    pub channel: Option<String>,
    /// Publish timestamp.
    pub published_at: Option<DateTime<Utc>>,
    /// Tags flattened to a comma-joined string; absent when the provider
    /// returned none.
    pub tags: Option<String>,
    /// Duration as reported by the metadata provider.
    pub duration: Option<String>,
    /// Resolved transcript language.
    pub language: String,
    /// Which caption source the transcript came from.
    pub transcript_source: TranscriptSource,
}

/// A unit of indexed transcript text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedChunk {
    /// Unique chunk ID.
    pub id: Uuid,
    /// Video this chunk belongs to.
    pub video_id: String,
    /// Text content of this chunk.
    pub text: String,
    /// Order of this chunk within the video's transcript.
    pub chunk_order: i32,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// Shared ingestion metadata.
    pub metadata: ChunkMetadata,
    /// When this chunk was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl IndexedChunk {
    /// Create a new chunk.
    pub fn new(
        video_id: String,
        text: String,
        chunk_order: i32,
        embedding: Vec<f32>,
        metadata: ChunkMetadata,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            video_id,
            text,
            chunk_order,
            embedding,
            metadata,
            indexed_at: Utc::now(),
        }
    }
}

/// A query result with similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// The matched chunk, embedding included.
    pub chunk: IndexedChunk,
    /// Cosine similarity to the query (higher is better).
    pub score: f32,
}

/// Trait for embedding index implementations.
#[async_trait]
pub trait EmbeddingIndex: Send + Sync {
    /// Add chunks to the index. Each chunk carries its own video id.
    async fn add(&self, chunks: &[IndexedChunk]) -> Result<usize>;

    /// Delete every chunk for a video id. Returns the number removed.
    async fn delete(&self, video_id: &str) -> Result<usize>;

    /// Nearest-neighbor query scoped to one video id, descending by
    /// similarity, at most `limit` results.
    async fn query(
        &self,
        video_id: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>>;

    /// Number of chunks indexed for a video id.
    async fn count(&self, video_id: &str) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
pub(crate) fn test_metadata() -> ChunkMetadata {
    ChunkMetadata {
        source: "youtube".to_string(),
        title: "Test Video".to_string(),
        description: None,
        channel: Some("Test Channel".to_string()),
        published_at: None,
        tags: Some("one, two".to_string()),
        duration: Some("PT10M".to_string()),
        language: "en".to_string(),
        transcript_source: TranscriptSource::Manual,
    }
}
