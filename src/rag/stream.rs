//! Streamed answer generation.
//!
//! Generation output is a typed event stream consumed incrementally by the
//! transport: zero or more `message` events in model production order, then
//! exactly one terminal event (`end` or `error`). Termination is structural:
//! the producer task sends the terminal event and closes the channel.

use super::prompts::build_system_prompt;
use super::ContextPassage;
use crate::error::{Result, SporreError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Capacity of the event channel between producer and transport.
const EVENT_BUFFER: usize = 32;

/// One unit of a streamed answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum ChatEvent {
    /// An incremental answer segment.
    Message(String),
    /// Normal completion. Terminal.
    End,
    /// Generation failed mid-stream. Terminal.
    Error(String),
}

impl ChatEvent {
    /// Serialize as one newline-terminated JSON line.
    pub fn to_json_line(&self) -> String {
        let mut line = serde_json::to_string(self).expect("event serialization cannot fail");
        line.push('\n');
        line
    }
}

/// Trait for incremental text-generation capabilities.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Start a completion and return its incremental text segments.
    async fn stream_completion(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<BoxStream<'static, Result<String>>>;
}

/// Generator backed by OpenAI's streaming chat API.
pub struct OpenAIGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIGenerator {
    pub fn new(model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client: create_client(),
            model: model.into(),
            temperature,
        }
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    async fn stream_completion(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<BoxStream<'static, Result<String>>> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt.to_string())
                .build()
                .map_err(|e| SporreError::Generation(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt.to_string())
                .build()
                .map_err(|e| SporreError::Generation(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| SporreError::Generation(e.to_string()))?;

        let stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| SporreError::OpenAI(format!("Failed to start generation: {}", e)))?;

        Ok(stream
            .map(|item| match item {
                Ok(response) => Ok(response
                    .choices
                    .first()
                    .and_then(|choice| choice.delta.content.clone())
                    .unwrap_or_default()),
                Err(e) => Err(SporreError::Generation(e.to_string())),
            })
            .boxed())
    }
}

/// Drive one generation and emit its events into `tx`.
///
/// Always sends exactly one terminal event unless the receiver goes away
/// first; a failed send means the client disconnected, in which case the
/// upstream stream is dropped without being drained further.
pub(crate) async fn produce_answer(
    generator: Arc<dyn Generator>,
    passages: &[ContextPassage],
    question: &str,
    tx: &mpsc::Sender<ChatEvent>,
) {
    let system_prompt = build_system_prompt(passages);

    let mut stream = match generator.stream_completion(&system_prompt, question).await {
        Ok(stream) => stream,
        Err(e) => {
            let _ = tx.send(ChatEvent::Error(e.to_string())).await;
            return;
        }
    };

    while let Some(item) = stream.next().await {
        match item {
            Ok(segment) => {
                if segment.is_empty() {
                    continue;
                }
                if tx.send(ChatEvent::Message(segment)).await.is_err() {
                    debug!("Client disconnected, abandoning generation");
                    return;
                }
            }
            Err(e) => {
                let _ = tx.send(ChatEvent::Error(e.to_string())).await;
                return;
            }
        }
    }

    let _ = tx.send(ChatEvent::End).await;
}

/// Stream an answer for a question over already-retrieved context.
///
/// The returned receiver yields events in production order and closes after
/// the terminal event. Dropping it cancels the generation.
pub fn stream_answer(
    generator: Arc<dyn Generator>,
    passages: Vec<ContextPassage>,
    question: String,
) -> mpsc::Receiver<ChatEvent> {
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);

    tokio::spawn(async move {
        produce_answer(generator, &passages, &question, &tx).await;
    });

    rx
}
