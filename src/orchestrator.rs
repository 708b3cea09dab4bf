//! Ingestion orchestrator.
//!
//! Coordinates transcript resolution, dedup, invalidation, metadata
//! enrichment, chunking, and indexing into one idempotent ingest-or-skip
//! operation per video.

use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, SporreError};
use crate::index::{ChunkMetadata, EmbeddingIndex, IndexedChunk, SqliteEmbeddingIndex};
use crate::ingest::{
    fingerprint, normalize_text, split_text, IngestionStore, SqliteIngestionStore,
};
use crate::metadata::{MetadataProvider, YouTubeDataApi};
use crate::transcript::{TranscriptResolver, YtDlpTranscripts};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The main orchestrator for the ingestion pipeline.
pub struct Orchestrator {
    settings: Settings,
    resolver: Arc<TranscriptResolver>,
    records: Arc<dyn IngestionStore>,
    metadata: Arc<dyn MetadataProvider>,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn EmbeddingIndex>,
}

impl Orchestrator {
    /// Create a new orchestrator with the default component set.
    pub fn new(settings: Settings) -> Result<Self> {
        let resolver = Arc::new(TranscriptResolver::new(
            Arc::new(YtDlpTranscripts::new()),
            settings.transcript.language.clone(),
        ));
        let records = Arc::new(SqliteIngestionStore::new(&settings.records_path())?);
        let metadata = Arc::new(YouTubeDataApi::new(settings.youtube.resolve_api_key()));
        let embedder = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));
        let index = Arc::new(SqliteEmbeddingIndex::new(&settings.index_path())?);

        Ok(Self {
            settings,
            resolver,
            records,
            metadata,
            embedder,
            index,
        })
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        resolver: Arc<TranscriptResolver>,
        records: Arc<dyn IngestionStore>,
        metadata: Arc<dyn MetadataProvider>,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn EmbeddingIndex>,
    ) -> Self {
        Self {
            settings,
            resolver,
            records,
            metadata,
            embedder,
            index,
        }
    }

    /// Get a reference to the embedding index.
    pub fn index(&self) -> Arc<dyn EmbeddingIndex> {
        self.index.clone()
    }

    /// Get a reference to the embedder.
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Ingest a video's transcript. Returns the number of chunks added,
    /// 0 when the content is unchanged since the last ingest.
    ///
    /// Stages run strictly in order and every failure leaves the index for
    /// the video either empty or in its prior consistent state. The
    /// ingestion record is only written after indexing fully succeeds, so a
    /// record never points at a half-written chunk set.
    #[instrument(skip(self), fields(video_id = %video_id))]
    pub async fn ingest(&self, video_id: &str) -> Result<usize> {
        // Resolve. Failures propagate before anything is mutated.
        let resolved = self.resolver.resolve(video_id).await?;
        info!(
            "Resolved {} transcript for {} ({} chars, {} source)",
            resolved.language,
            video_id,
            resolved.text.len(),
            resolved.source
        );

        // Fingerprint off the async runtime; transcripts run to hundreds of
        // kilobytes.
        let text_for_hash = resolved.text.clone();
        let transcript_hash =
            tokio::task::spawn_blocking(move || fingerprint(&normalize_text(&text_for_hash)))
                .await
                .map_err(|e| SporreError::Internal(format!("fingerprint task failed: {}", e)))?;

        // Dedup short-circuit: unchanged content skips every later stage.
        let record = self.records.get(video_id, &resolved.language).await?;
        if let Some(record) = &record {
            if record.transcript_hash == transcript_hash {
                info!("Transcript for {} unchanged, skipping", video_id);
                return Ok(0);
            }
        }

        // Invalidate: the index never holds two content versions at once.
        let removed = self.index.delete(video_id).await?;
        if removed > 0 {
            info!("Invalidated {} stale chunks for {}", removed, video_id);
        }

        // Enrich. A failure here leaves the index empty for this video,
        // consistent with the invalidation above.
        let video_meta = self.metadata.fetch(video_id).await?;

        let chunk_metadata = ChunkMetadata {
            source: "youtube".to_string(),
            title: video_meta.title,
            description: video_meta.description,
            channel: video_meta.channel,
            published_at: video_meta.published_at,
            tags: if video_meta.tags.is_empty() {
                None
            } else {
                Some(video_meta.tags.join(", "))
            },
            duration: video_meta.duration,
            language: resolved.language.clone(),
            transcript_source: resolved.source,
        };

        // Chunk.
        let pieces = split_text(
            &resolved.text,
            self.settings.chunking.chunk_size,
            self.settings.chunking.chunk_overlap,
        );

        // Index, rolling back to the empty state if the write fails.
        let added = match self.index_pieces(video_id, pieces, chunk_metadata).await {
            Ok(added) => added,
            Err(e) => {
                warn!("Indexing {} failed, rolling back: {}", video_id, e);
                if let Err(rollback) = self.index.delete(video_id).await {
                    warn!("Rollback delete for {} failed: {}", video_id, rollback);
                }
                return Err(e);
            }
        };

        // Record only after the index is fully written.
        self.records
            .upsert(video_id, &resolved.language, &transcript_hash)
            .await?;

        info!("Ingested {} chunks for {}", added, video_id);
        Ok(added)
    }

    /// Embed chunk texts and add them to the index.
    async fn index_pieces(
        &self,
        video_id: &str,
        pieces: Vec<String>,
        metadata: ChunkMetadata,
    ) -> Result<usize> {
        let embeddings = self.embedder.embed_batch(&pieces).await?;

        let chunks: Vec<IndexedChunk> = pieces
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(order, (text, embedding))| {
                IndexedChunk::new(
                    video_id.to_string(),
                    text,
                    order as i32,
                    embedding,
                    metadata.clone(),
                )
            })
            .collect();

        self.index.add(&chunks).await
    }
}
