//! Configuration settings for Sporre.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub transcript: TranscriptSettings,
    pub chunking: ChunkingSettings,
    pub embedding: EmbeddingSettings,
    pub index: IndexSettings,
    pub records: RecordsSettings,
    pub youtube: YoutubeSettings,
    pub retrieval: RetrievalSettings,
    pub rerank: RerankSettings,
    pub chat: ChatSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.sporre".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Transcript resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Language the resolver requires of every caption source.
    pub language: String,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
        }
    }
}

/// Transcript chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters of trailing context shared between consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 180,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (openai).
    pub provider: String,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Embedding index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Index provider (sqlite, memory).
    pub provider: String,
    /// Path to the SQLite index database (for sqlite provider).
    pub sqlite_path: String,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            provider: "sqlite".to_string(),
            sqlite_path: "~/.sporre/vectors.db".to_string(),
        }
    }
}

/// Ingestion record store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordsSettings {
    /// Path to the SQLite ingestion record database.
    pub sqlite_path: String,
}

impl Default for RecordsSettings {
    fn default() -> Self {
        Self {
            sqlite_path: "~/.sporre/ingestions.db".to_string(),
        }
    }
}

/// YouTube-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct YoutubeSettings {
    /// YouTube Data API key. Falls back to the YOUTUBE_API_KEY environment
    /// variable when unset.
    pub api_key: Option<String>,
}

impl YoutubeSettings {
    /// Resolve the API key from config or environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("YOUTUBE_API_KEY").ok())
            .filter(|k| !k.is_empty())
    }
}

/// Base retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of passages selected from the candidate pool.
    pub k: usize,
    /// Size of the nearest-neighbor candidate pool.
    pub fetch_k: usize,
    /// Relevance weight for diversity-aware selection (0.0 diversity, 1.0 relevance).
    pub mmr_lambda: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            k: 10,
            fetch_k: 20,
            mmr_lambda: 0.4,
        }
    }
}

/// Relevance reranking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankSettings {
    /// Rerank model identifier.
    pub model: String,
    /// Number of passages kept after reranking.
    pub top_n: usize,
    /// Rerank API key. Falls back to the COHERE_API_KEY environment variable
    /// when unset.
    pub api_key: Option<String>,
}

impl Default for RerankSettings {
    fn default() -> Self {
        Self {
            model: "rerank-english-v3.0".to_string(),
            top_n: 4,
            api_key: None,
        }
    }
}

impl RerankSettings {
    /// Resolve the API key from config or environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("COHERE_API_KEY").ok())
            .filter(|k| !k.is_empty())
    }
}

/// Answer generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// LLM model for answer generation.
    pub model: String,
    /// Sampling temperature for answer generation.
    pub temperature: f32,
    /// Maximum conversation turns to carry. Reserved for conversation memory;
    /// the core pipelines do not read it.
    pub max_history_messages: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_history_messages: 10,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SporreError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sporre")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded embedding index database path.
    pub fn index_path(&self) -> PathBuf {
        Self::expand_path(&self.index.sqlite_path)
    }

    /// Get the expanded ingestion record database path.
    pub fn records_path(&self) -> PathBuf {
        Self::expand_path(&self.records.sqlite_path)
    }
}
