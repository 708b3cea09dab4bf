//! Retrieval-augmented question answering over indexed transcripts.
//!
//! Retrieval is two-stage: a diversity-aware nearest-neighbor pass over the
//! embedding index, then a learned-relevance rerank that truncates to the
//! passages actually handed to generation. Answers are produced as a typed
//! event stream with exactly one terminal event.

mod engine;
mod mmr;
pub mod prompts;
mod rerank;
mod retriever;
mod stream;

pub use engine::ChatEngine;
pub use mmr::mmr_select;
pub use rerank::{CohereReranker, Reranker};
pub use retriever::Retriever;
pub use stream::{stream_answer, ChatEvent, Generator, OpenAIGenerator};

use crate::index::ScoredChunk;

/// A retrieved passage formatted for inclusion as generation context.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextPassage {
    /// Video the passage came from.
    pub video_id: String,
    /// Video title.
    pub title: String,
    /// Passage text.
    pub text: String,
    /// Relevance score (base similarity, replaced by the reranker's learned
    /// score after stage two).
    pub relevance: f32,
}

impl From<ScoredChunk> for ContextPassage {
    fn from(result: ScoredChunk) -> Self {
        Self {
            video_id: result.chunk.video_id.clone(),
            title: result.chunk.metadata.title.clone(),
            text: result.chunk.text,
            relevance: result.score,
        }
    }
}
