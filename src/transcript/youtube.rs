//! YouTube caption provider backed by yt-dlp.
//!
//! yt-dlp's metadata dump lists manually authored tracks under `subtitles`
//! and generated ones under `automatic_captions`, each mapping a language to
//! track variants. The `json3` variant carries timed events we can parse
//! without an XML dependency.

use super::{TranscriptProvider, TranscriptSegment};
use crate::error::{Result, SporreError};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

/// Caption track kind, as named in yt-dlp's dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackKind {
    Manual,
    Generated,
}

impl TrackKind {
    fn dump_key(self) -> &'static str {
        match self {
            TrackKind::Manual => "subtitles",
            TrackKind::Generated => "automatic_captions",
        }
    }
}

/// YouTube transcript provider.
pub struct YtDlpTranscripts {
    http: reqwest::Client,
    // Both resolver attempts hit the same video; remember the last dump so
    // the fallback does not spawn yt-dlp twice.
    probe_cache: Mutex<Option<(String, Value)>>,
}

impl YtDlpTranscripts {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            probe_cache: Mutex::new(None),
        }
    }

    /// Fetch yt-dlp's metadata dump for a video.
    async fn probe(&self, video_id: &str) -> Result<Value> {
        {
            let cache = self.probe_cache.lock().await;
            if let Some((cached_id, dump)) = cache.as_ref() {
                if cached_id == video_id {
                    return Ok(dump.clone());
                }
            }
        }

        let url = format!("https://www.youtube.com/watch?v={}", video_id);

        let output = tokio::process::Command::new("yt-dlp")
            .args(["--dump-json", "--no-download", "--no-warnings", &url])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SporreError::ToolNotFound("yt-dlp".to_string())
                } else {
                    SporreError::Transcript(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SporreError::Transcript(format!(
                "Video {} not found or unavailable: {}",
                video_id, stderr
            )));
        }

        let dump: Value = serde_json::from_slice(&output.stdout).map_err(|e| {
            SporreError::Transcript(format!("Failed to parse yt-dlp output: {}", e))
        })?;

        let mut cache = self.probe_cache.lock().await;
        *cache = Some((video_id.to_string(), dump.clone()));

        Ok(dump)
    }

    async fn fetch_track(
        &self,
        video_id: &str,
        kind: TrackKind,
        language: &str,
    ) -> Result<Option<Vec<TranscriptSegment>>> {
        let dump = self.probe(video_id).await?;

        if captions_disabled(&dump) {
            return Err(SporreError::TranscriptsDisabled(video_id.to_string()));
        }

        let Some(url) = select_track_url(&dump, kind.dump_key(), language) else {
            return Ok(None);
        };

        debug!("Fetching {} {} track for {}", language, kind.dump_key(), video_id);

        let payload: Value = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(Some(parse_json3_events(&payload)))
    }
}

impl Default for YtDlpTranscripts {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptProvider for YtDlpTranscripts {
    async fn manual(
        &self,
        video_id: &str,
        language: &str,
    ) -> Result<Option<Vec<TranscriptSegment>>> {
        self.fetch_track(video_id, TrackKind::Manual, language).await
    }

    async fn generated(
        &self,
        video_id: &str,
        language: &str,
    ) -> Result<Option<Vec<TranscriptSegment>>> {
        self.fetch_track(video_id, TrackKind::Generated, language)
            .await
    }
}

/// A video with captions turned off exposes no tracks of either kind.
fn captions_disabled(dump: &Value) -> bool {
    let has_entries = |key: &str| {
        dump.get(key)
            .and_then(|v| v.as_object())
            .map(|m| !m.is_empty())
            .unwrap_or(false)
    };

    !has_entries("subtitles") && !has_entries("automatic_captions")
}

/// Pick the track URL for a language, preferring the `json3` variant.
fn select_track_url(dump: &Value, dump_key: &str, language: &str) -> Option<String> {
    let variants = dump.get(dump_key)?.get(language)?.as_array()?;

    let json3 = variants
        .iter()
        .find(|v| v.get("ext").and_then(|e| e.as_str()) == Some("json3"));

    json3
        .or_else(|| variants.first())
        .and_then(|v| v.get("url"))
        .and_then(|u| u.as_str())
        .map(|u| u.to_string())
}

/// Parse a `json3` caption payload into timed segments.
fn parse_json3_events(payload: &Value) -> Vec<TranscriptSegment> {
    let Some(events) = payload.get("events").and_then(|e| e.as_array()) else {
        return Vec::new();
    };

    events
        .iter()
        .filter_map(|event| {
            let segs = event.get("segs")?.as_array()?;
            let text: String = segs
                .iter()
                .filter_map(|s| s.get("utf8").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join("");

            let text = text.trim().to_string();
            if text.is_empty() {
                return None;
            }

            let start_ms = event.get("tStartMs").and_then(|v| v.as_f64()).unwrap_or(0.0);
            let duration_ms = event
                .get("dDurationMs")
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0);

            Some(TranscriptSegment {
                text,
                start_seconds: start_ms / 1000.0,
                duration_seconds: duration_ms / 1000.0,
            })
        })
        .collect()
}
