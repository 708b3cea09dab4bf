//! Cross-encoder relevance reranking.
//!
//! Vector similarity is a coarse relevance signal; the rerank stage rescores
//! the MMR-selected candidates with a model trained directly on
//! query/document relevance and keeps only the top few.

use super::ContextPassage;
use crate::error::{Result, SporreError};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

const COHERE_RERANK_ENDPOINT: &str = "https://api.cohere.com/v1/rerank";

/// Trait for relevance rerankers.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Reorder passages by learned relevance to the query and truncate to
    /// `top_n`, descending.
    async fn rerank(
        &self,
        query: &str,
        passages: Vec<ContextPassage>,
        top_n: usize,
    ) -> Result<Vec<ContextPassage>>;
}

/// Reranker backed by Cohere's rerank API.
pub struct CohereReranker {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct RerankResponse {
    results: Vec<RerankEntry>,
}

#[derive(Debug, Deserialize)]
struct RerankEntry {
    index: usize,
    relevance_score: f32,
}

impl CohereReranker {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Reranker for CohereReranker {
    #[instrument(skip(self, passages), fields(count = passages.len()))]
    async fn rerank(
        &self,
        query: &str,
        passages: Vec<ContextPassage>,
        top_n: usize,
    ) -> Result<Vec<ContextPassage>> {
        if passages.is_empty() || top_n == 0 {
            return Ok(Vec::new());
        }

        let api_key = self.api_key.as_deref().ok_or_else(|| {
            SporreError::Rerank(
                "Rerank API key not configured (set COHERE_API_KEY or rerank.api_key)".to_string(),
            )
        })?;

        let documents: Vec<&str> = passages.iter().map(|p| p.text.as_str()).collect();

        let response = self
            .http
            .post(COHERE_RERANK_ENDPOINT)
            .bearer_auth(api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "query": query,
                "documents": documents,
                "top_n": top_n,
            }))
            .send()
            .await?
            .error_for_status()?;

        let parsed: RerankResponse = response.json().await?;
        debug!("Reranked {} passages to {}", passages.len(), parsed.results.len());

        map_rerank_results(passages, parsed.results, top_n)
    }
}

/// Map API result entries back onto the submitted passages.
fn map_rerank_results(
    passages: Vec<ContextPassage>,
    mut results: Vec<RerankEntry>,
    top_n: usize,
) -> Result<Vec<ContextPassage>> {
    results.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut reranked = Vec::with_capacity(top_n.min(results.len()));
    for entry in results.into_iter().take(top_n) {
        let passage = passages.get(entry.index).ok_or_else(|| {
            SporreError::Rerank(format!("Rerank result index {} out of range", entry.index))
        })?;
        reranked.push(ContextPassage {
            relevance: entry.relevance_score,
            ..passage.clone()
        });
    }

    Ok(reranked)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(text: &str) -> ContextPassage {
        ContextPassage {
            video_id: "video1".to_string(),
            title: "Test Video".to_string(),
            text: text.to_string(),
            relevance: 0.0,
        }
    }

    #[test]
    fn test_map_results_sorts_and_truncates() {
        let passages = vec![passage("a"), passage("b"), passage("c")];
        let results = vec![
            RerankEntry { index: 2, relevance_score: 0.4 },
            RerankEntry { index: 0, relevance_score: 0.9 },
            RerankEntry { index: 1, relevance_score: 0.7 },
        ];

        let reranked = map_rerank_results(passages, results, 2).unwrap();
        assert_eq!(reranked.len(), 2);
        assert_eq!(reranked[0].text, "a");
        assert!((reranked[0].relevance - 0.9).abs() < f32::EPSILON);
        assert_eq!(reranked[1].text, "b");
    }

    #[test]
    fn test_map_results_rejects_out_of_range_index() {
        let passages = vec![passage("only")];
        let results = vec![RerankEntry { index: 5, relevance_score: 0.5 }];
        assert!(map_rerank_results(passages, results, 4).is_err());
    }

    #[tokio::test]
    async fn test_missing_api_key_fails() {
        let reranker = CohereReranker::new(None, "rerank-english-v3.0");
        let err = reranker
            .rerank("question", vec![passage("text")], 4)
            .await
            .unwrap_err();
        assert!(matches!(err, SporreError::Rerank(_)));
    }

    #[tokio::test]
    async fn test_empty_passages_short_circuit() {
        let reranker = CohereReranker::new(None, "rerank-english-v3.0");
        let reranked = reranker.rerank("question", Vec::new(), 4).await.unwrap();
        assert!(reranked.is_empty());
    }
}
