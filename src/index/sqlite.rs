//! SQLite-based embedding index implementation.
//!
//! Stores embeddings as little-endian f32 BLOBs and computes cosine
//! similarity in Rust. For large libraries, consider the sqlite-vec extension
//! or a dedicated vector database.

use super::{cosine_similarity, ChunkMetadata, EmbeddingIndex, IndexedChunk, ScoredChunk};
use crate::error::{Result, SporreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// SQLite-based embedding index.
pub struct SqliteEmbeddingIndex {
    conn: Mutex<Connection>,
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS chunks (
    id TEXT PRIMARY KEY,
    video_id TEXT NOT NULL,
    content TEXT NOT NULL,
    chunk_order INTEGER NOT NULL,
    embedding BLOB NOT NULL,
    metadata TEXT NOT NULL,
    indexed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chunks_video_id ON chunks(video_id);
"#;

impl SqliteEmbeddingIndex {
    /// Open (or create) the index at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL improves concurrent read behavior while an ingest writes.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized embedding index at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory index (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }

    fn row_to_chunk(
        id: String,
        video_id: String,
        content: String,
        chunk_order: i32,
        embedding: Vec<u8>,
        metadata: String,
        indexed_at: String,
    ) -> Result<IndexedChunk> {
        let metadata: ChunkMetadata = serde_json::from_str(&metadata)?;
        let id = Uuid::parse_str(&id)
            .map_err(|e| SporreError::Index(format!("Invalid chunk id: {}", e)))?;
        let indexed_at = DateTime::parse_from_rfc3339(&indexed_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(IndexedChunk {
            id,
            video_id,
            text: content,
            chunk_order,
            embedding: Self::bytes_to_embedding(&embedding),
            metadata,
            indexed_at,
        })
    }

    fn load_chunks(&self, video_id: &str) -> Result<Vec<IndexedChunk>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, video_id, content, chunk_order, embedding, metadata, indexed_at
             FROM chunks WHERE video_id = ?1 ORDER BY chunk_order",
        )?;

        let rows = stmt.query_map(params![video_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i32>(3)?,
                row.get::<_, Vec<u8>>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut chunks = Vec::new();
        for row in rows {
            let (id, video_id, content, chunk_order, embedding, metadata, indexed_at) = row?;
            chunks.push(Self::row_to_chunk(
                id, video_id, content, chunk_order, embedding, metadata, indexed_at,
            )?);
        }

        Ok(chunks)
    }
}

#[async_trait]
impl EmbeddingIndex for SqliteEmbeddingIndex {
    async fn add(&self, chunks: &[IndexedChunk]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        for chunk in chunks {
            tx.execute(
                "INSERT OR REPLACE INTO chunks
                 (id, video_id, content, chunk_order, embedding, metadata, indexed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    chunk.id.to_string(),
                    chunk.video_id,
                    chunk.text,
                    chunk.chunk_order,
                    Self::embedding_to_bytes(&chunk.embedding),
                    serde_json::to_string(&chunk.metadata)?,
                    chunk.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        debug!("Indexed {} chunks", chunks.len());

        Ok(chunks.len())
    }

    async fn delete(&self, video_id: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute("DELETE FROM chunks WHERE video_id = ?1", params![video_id])?;
        Ok(removed)
    }

    async fn query(
        &self,
        video_id: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let chunks = self.load_chunks(video_id)?;

        let mut results: Vec<ScoredChunk> = chunks
            .into_iter()
            .map(|chunk| ScoredChunk {
                score: cosine_similarity(query_embedding, &chunk.embedding),
                chunk,
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        Ok(results)
    }

    async fn count(&self, video_id: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE video_id = ?1",
            params![video_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
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

    #[test]
    fn test_embedding_bytes_roundtrip() {
        let embedding = vec![0.5, -1.25, 3.75, 0.0];
        let bytes = SqliteEmbeddingIndex::embedding_to_bytes(&embedding);
        assert_eq!(bytes.len(), 16);
        assert_eq!(SqliteEmbeddingIndex::bytes_to_embedding(&bytes), embedding);
    }

    #[tokio::test]
    async fn test_add_and_query_roundtrip() {
        let index = SqliteEmbeddingIndex::in_memory().unwrap();

        index
            .add(&[
                chunk("video1", "about rust", 0, vec![1.0, 0.0]),
                chunk("video1", "about fish", 1, vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let results = index.query("video1", &[0.9, 0.1], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.text, "about rust");
        assert_eq!(results[0].chunk.metadata.title, "Test Video");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_delete_scopes_to_video() {
        let index = SqliteEmbeddingIndex::in_memory().unwrap();

        index
            .add(&[
                chunk("video1", "a", 0, vec![1.0, 0.0]),
                chunk("video2", "b", 0, vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        assert_eq!(index.delete("video1").await.unwrap(), 1);
        assert_eq!(index.count("video1").await.unwrap(), 0);
        assert_eq!(index.count("video2").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_add_empty_is_noop() {
        let index = SqliteEmbeddingIndex::in_memory().unwrap();
        assert_eq!(index.add(&[]).await.unwrap(), 0);
    }
}
