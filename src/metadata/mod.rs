//! Video metadata enrichment.
//!
//! Indexed chunks carry descriptive metadata (title, channel, tags, ...)
//! fetched from an external provider at ingest time.

mod youtube;

pub use youtube::YouTubeDataApi;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Descriptive metadata for one video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    /// Video title.
    pub title: String,
    /// Video description.
    pub description: Option<String>,
    /// Channel/author name.
    pub channel: Option<String>,
    /// Publish timestamp.
    pub published_at: Option<DateTime<Utc>>,
    /// Tag list, possibly empty.
    pub tags: Vec<String>,
    /// Duration as reported by the provider (ISO-8601, e.g. "PT5M33S").
    pub duration: Option<String>,
}

/// Trait for metadata providers.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch metadata for a video id.
    ///
    /// An unknown video id fails with `MetadataNotFound`; transport and
    /// provider errors fail with `Metadata`.
    async fn fetch(&self, video_id: &str) -> Result<VideoMetadata>;
}
