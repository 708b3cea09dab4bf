//! Two-stage context retrieval.

use super::{mmr_select, ContextPassage, Reranker};
use crate::config::RetrievalSettings;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::index::EmbeddingIndex;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Retrieves context passages for a question, scoped to one video.
pub struct Retriever {
    index: Arc<dyn EmbeddingIndex>,
    embedder: Arc<dyn Embedder>,
    reranker: Arc<dyn Reranker>,
    settings: RetrievalSettings,
    top_n: usize,
}

impl Retriever {
    pub fn new(
        index: Arc<dyn EmbeddingIndex>,
        embedder: Arc<dyn Embedder>,
        reranker: Arc<dyn Reranker>,
        settings: RetrievalSettings,
        top_n: usize,
    ) -> Self {
        Self {
            index,
            embedder,
            reranker,
            settings,
            top_n,
        }
    }

    /// Retrieve up to `top_n` passages, descending by learned relevance.
    ///
    /// Stage one pulls `fetch_k` nearest neighbors and narrows them to `k`
    /// by maximal marginal relevance; stage two reranks those and keeps the
    /// top `top_n`.
    #[instrument(skip(self), fields(video_id = %video_id))]
    pub async fn retrieve(&self, video_id: &str, question: &str) -> Result<Vec<ContextPassage>> {
        let query_embedding = self.embedder.embed(question).await?;

        let pool = self
            .index
            .query(video_id, &query_embedding, self.settings.fetch_k)
            .await?;
        debug!("Base retrieval returned {} candidates", pool.len());

        let selected = mmr_select(
            &query_embedding,
            pool,
            self.settings.k,
            self.settings.mmr_lambda,
        );

        let passages: Vec<ContextPassage> =
            selected.into_iter().map(ContextPassage::from).collect();

        self.reranker.rerank(question, passages, self.top_n).await
    }
}
