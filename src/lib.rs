//! Sporre - Transcript Question Answering
//!
//! A service and CLI for asking questions about long-form video transcripts.
//!
//! The name "Sporre" comes from the Norwegian word "spørre," meaning "to ask."
//!
//! # Overview
//!
//! Sporre allows you to:
//! - Ingest YouTube video transcripts into a searchable vector index, exactly
//!   once per content version
//! - Ask questions about an ingested video and get a streamed, context-grounded
//!   answer
//! - Serve both operations over HTTP for integration with other systems
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `transcript` - Transcript resolution over ordered caption sources
//! - `metadata` - Video metadata enrichment
//! - `ingest` - Normalization, fingerprinting, chunking, and ingestion records
//! - `embedding` - Embedding generation
//! - `index` - Per-video embedding index abstraction
//! - `rag` - Retrieval, reranking, and streamed answer generation
//! - `orchestrator` - Ingestion pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use sporre::config::Settings;
//! use sporre::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     // Ingest a video's transcript; returns 0 when content is unchanged.
//!     let chunks = orchestrator.ingest("dQw4w9WgXcQ").await?;
//!     println!("Indexed {} chunks", chunks);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod ingest;
pub mod metadata;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod transcript;

pub use error::{Result, SporreError};
