//! Configuration management for Sporre.

mod settings;

pub use settings::{
    ChatSettings, ChunkingSettings, EmbeddingSettings, GeneralSettings, IndexSettings,
    RecordsSettings, RerankSettings, RetrievalSettings, Settings, TranscriptSettings,
    YoutubeSettings,
};
