//! HTTP API server.
//!
//! Exposes the ingestion and chat pipelines over REST. Chat responses are
//! streamed as newline-delimited JSON events.

use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::index::SqliteEmbeddingIndex;
use crate::ingest::SqliteIngestionStore;
use crate::metadata::YouTubeDataApi;
use crate::orchestrator::Orchestrator;
use crate::rag::{ChatEngine, CohereReranker, OpenAIGenerator, Retriever};
use crate::transcript::{TranscriptResolver, YtDlpTranscripts};
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
    engine: ChatEngine,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    // Clients are constructed once here and handed to both pipelines.
    let embedder = Arc::new(OpenAIEmbedder::with_config(
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
    ));
    let index = Arc::new(SqliteEmbeddingIndex::new(&settings.index_path())?);
    let records = Arc::new(SqliteIngestionStore::new(&settings.records_path())?);
    let resolver = Arc::new(TranscriptResolver::new(
        Arc::new(YtDlpTranscripts::new()),
        settings.transcript.language.clone(),
    ));
    let metadata = Arc::new(YouTubeDataApi::new(settings.youtube.resolve_api_key()));
    let reranker = Arc::new(CohereReranker::new(
        settings.rerank.resolve_api_key(),
        settings.rerank.model.clone(),
    ));
    let generator = Arc::new(OpenAIGenerator::new(
        settings.chat.model.clone(),
        settings.chat.temperature,
    ));

    let retriever = Arc::new(Retriever::new(
        index.clone(),
        embedder.clone(),
        reranker,
        settings.retrieval.clone(),
        settings.rerank.top_n,
    ));

    let orchestrator = Orchestrator::with_components(
        settings.clone(),
        resolver,
        records,
        metadata,
        embedder,
        index,
    );
    let engine = ChatEngine::with_components(retriever, generator);

    let state = Arc::new(AppState {
        orchestrator,
        engine,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/ingest", post(ingest))
        .route("/chat", post(chat))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Sporre API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Ingest", "POST /ingest");
    Output::kv("Chat (streaming)", "POST /chat");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct IngestRequest {
    video_id: String,
}

#[derive(Serialize)]
struct IngestResponse {
    status: &'static str,
    chunks_added: usize,
}

#[derive(Deserialize)]
struct ChatRequest {
    video_id: String,
    question: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IngestRequest>,
) -> impl IntoResponse {
    match state.orchestrator.ingest(&req.video_id).await {
        Ok(chunks_added) => Json(IngestResponse {
            status: "success",
            chunks_added,
        })
        .into_response(),
        Err(e) if e.is_client_error() => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    let rx = state.engine.stream_chat(req.video_id, req.question);

    // One JSON object per line; the channel closes after the terminal event,
    // and dropping this stream on client disconnect cancels the producer.
    let body = Body::from_stream(
        ReceiverStream::new(rx).map(|event| Ok::<_, Infallible>(event.to_json_line())),
    );

    (
        [
            (header::CONTENT_TYPE, "application/x-ndjson"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        body,
    )
        .into_response()
}
