//! Chat engine: retrieval plus streamed generation for one question.

use super::stream::produce_answer;
use super::{ChatEvent, CohereReranker, Generator, OpenAIGenerator, Retriever};
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::error::Result;
use crate::index::SqliteEmbeddingIndex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, instrument};

/// Capacity of the event channel between producer and transport.
const EVENT_BUFFER: usize = 32;

/// Answers questions about one ingested video as an event stream.
pub struct ChatEngine {
    retriever: Arc<Retriever>,
    generator: Arc<dyn Generator>,
}

impl ChatEngine {
    /// Create an engine with the default component set from settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let embedder = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));
        let index = Arc::new(SqliteEmbeddingIndex::new(&settings.index_path())?);
        let reranker = Arc::new(CohereReranker::new(
            settings.rerank.resolve_api_key(),
            settings.rerank.model.clone(),
        ));

        let retriever = Arc::new(Retriever::new(
            index,
            embedder,
            reranker,
            settings.retrieval.clone(),
            settings.rerank.top_n,
        ));

        let generator = Arc::new(OpenAIGenerator::new(
            settings.chat.model.clone(),
            settings.chat.temperature,
        ));

        Ok(Self {
            retriever,
            generator,
        })
    }

    /// Create an engine with custom components.
    pub fn with_components(retriever: Arc<Retriever>, generator: Arc<dyn Generator>) -> Self {
        Self {
            retriever,
            generator,
        }
    }

    /// Answer a question about a video as a stream of events.
    ///
    /// The stream always carries exactly one terminal event; retrieval
    /// failures surface as that event too, since the transport has already
    /// committed to a streamed response. Dropping the receiver cancels the
    /// work.
    #[instrument(skip(self), fields(video_id = %video_id))]
    pub fn stream_chat(&self, video_id: String, question: String) -> mpsc::Receiver<ChatEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let retriever = self.retriever.clone();
        let generator = self.generator.clone();

        tokio::spawn(async move {
            let passages = match retriever.retrieve(&video_id, &question).await {
                Ok(passages) => passages,
                Err(e) => {
                    let _ = tx.send(ChatEvent::Error(e.to_string())).await;
                    return;
                }
            };

            info!("Retrieved {} passages for {}", passages.len(), video_id);
            produce_answer(generator, &passages, &question, &tx).await;
        });

        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetrievalSettings;
    use crate::embedding::Embedder;
    use crate::error::SporreError;
    use crate::index::{test_metadata, EmbeddingIndex, IndexedChunk, MemoryEmbeddingIndex};
    use crate::rag::{ContextPassage, Reranker};
    use async_trait::async_trait;
    use futures::stream::BoxStream;
    use futures::StreamExt;

    struct FlatEmbedder;

    #[async_trait]
    impl Embedder for FlatEmbedder {
        async fn embed(&self, _text: &str) -> crate::error::Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> crate::error::Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    struct PassthroughReranker;

    #[async_trait]
    impl Reranker for PassthroughReranker {
        async fn rerank(
            &self,
            _query: &str,
            mut passages: Vec<ContextPassage>,
            top_n: usize,
        ) -> crate::error::Result<Vec<ContextPassage>> {
            passages.truncate(top_n);
            Ok(passages)
        }
    }

    struct EchoGenerator;

    #[async_trait]
    impl Generator for EchoGenerator {
        async fn stream_completion(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
        ) -> crate::error::Result<BoxStream<'static, crate::error::Result<String>>> {
            Ok(futures::stream::iter(vec![Ok("- answer\n".to_string())]).boxed())
        }
    }

    struct BrokenEmbedder;

    #[async_trait]
    impl Embedder for BrokenEmbedder {
        async fn embed(&self, _text: &str) -> crate::error::Result<Vec<f32>> {
            Err(SporreError::Embedding("no backend".to_string()))
        }

        async fn embed_batch(&self, _texts: &[String]) -> crate::error::Result<Vec<Vec<f32>>> {
            Err(SporreError::Embedding("no backend".to_string()))
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn engine_with(embedder: Arc<dyn Embedder>, index: Arc<dyn EmbeddingIndex>) -> ChatEngine {
        let retriever = Arc::new(Retriever::new(
            index,
            embedder,
            Arc::new(PassthroughReranker),
            RetrievalSettings::default(),
            4,
        ));
        ChatEngine::with_components(retriever, Arc::new(EchoGenerator))
    }

    #[tokio::test]
    async fn test_stream_chat_yields_answer_then_end() {
        let index = Arc::new(MemoryEmbeddingIndex::new());
        index
            .add(&[IndexedChunk::new(
                "video1".to_string(),
                "some context".to_string(),
                0,
                vec![1.0, 0.0],
                test_metadata(),
            )])
            .await
            .unwrap();

        let engine = engine_with(Arc::new(FlatEmbedder), index);
        let mut rx = engine.stream_chat("video1".to_string(), "what is this?".to_string());

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert_eq!(
            events,
            vec![ChatEvent::Message("- answer\n".to_string()), ChatEvent::End]
        );
    }

    #[tokio::test]
    async fn test_retrieval_failure_becomes_error_event() {
        let engine = engine_with(Arc::new(BrokenEmbedder), Arc::new(MemoryEmbeddingIndex::new()));
        let mut rx = engine.stream_chat("video1".to_string(), "question".to_string());

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], ChatEvent::Error(msg) if msg.contains("no backend")));
    }
}
