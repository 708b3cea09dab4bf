//! Transcript resolution over ordered caption sources.
//!
//! A video can carry a manually authored caption track, an automatically
//! generated one, both, or neither. The resolver walks an explicit ordered
//! attempt list and returns the first source that yields data, tagged with
//! where it came from.

mod youtube;

pub use youtube::YtDlpTranscripts;

use crate::error::{Result, SporreError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// A single timed caption segment.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    /// Caption text.
    pub text: String,
    /// Start offset in the video, seconds.
    pub start_seconds: f64,
    /// Segment duration, seconds.
    pub duration_seconds: f64,
}

/// Which caption source produced a resolved transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptSource {
    /// Manually authored captions.
    Manual,
    /// Automatically generated captions.
    Auto,
}

impl std::fmt::Display for TranscriptSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptSource::Manual => write!(f, "manual"),
            TranscriptSource::Auto => write!(f, "auto"),
        }
    }
}

/// A fully resolved transcript for one video.
#[derive(Debug, Clone)]
pub struct ResolvedTranscript {
    /// Segment texts joined with single spaces, in original order.
    pub text: String,
    /// Language the transcript was resolved in.
    pub language: String,
    /// Which source won the attempt list.
    pub source: TranscriptSource,
}

/// Trait for caption track providers.
///
/// `Ok(None)` means the provider has no track of that kind in the requested
/// language. A video with captions turned off entirely fails with
/// `TranscriptsDisabled` instead.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the manually authored track, if one exists.
    async fn manual(
        &self,
        video_id: &str,
        language: &str,
    ) -> Result<Option<Vec<TranscriptSegment>>>;

    /// Fetch the automatically generated track, if one exists.
    async fn generated(
        &self,
        video_id: &str,
        language: &str,
    ) -> Result<Option<Vec<TranscriptSegment>>>;
}

/// Resolves a transcript by walking caption sources in preference order.
pub struct TranscriptResolver {
    provider: Arc<dyn TranscriptProvider>,
    language: String,
}

impl TranscriptResolver {
    pub fn new(provider: Arc<dyn TranscriptProvider>, language: impl Into<String>) -> Self {
        Self {
            provider,
            language: language.into(),
        }
    }

    /// Resolve the transcript for a video.
    ///
    /// Attempts, in order: manual captions, then generated captions, both in
    /// the configured language. The first attempt that yields a non-empty
    /// track wins. Fails with `TranscriptNotFound` when no attempt yields
    /// data; `TranscriptsDisabled` from the provider propagates as-is. Both
    /// failures are terminal for the video.
    pub async fn resolve(&self, video_id: &str) -> Result<ResolvedTranscript> {
        const ATTEMPTS: [TranscriptSource; 2] = [TranscriptSource::Manual, TranscriptSource::Auto];

        for source in ATTEMPTS {
            let segments = match source {
                TranscriptSource::Manual => {
                    self.provider.manual(video_id, &self.language).await?
                }
                TranscriptSource::Auto => {
                    self.provider.generated(video_id, &self.language).await?
                }
            };

            let Some(segments) = segments else {
                debug!("No {} transcript for {} in {}", source, video_id, self.language);
                continue;
            };

            let text = join_segments(&segments);
            if text.is_empty() {
                debug!("Empty {} transcript for {}, trying next source", source, video_id);
                continue;
            }

            return Ok(ResolvedTranscript {
                text,
                language: self.language.clone(),
                source,
            });
        }

        Err(SporreError::TranscriptNotFound(self.language.clone()))
    }
}

/// Join segment texts with single spaces, preserving order.
fn join_segments(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
