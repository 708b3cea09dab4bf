//! YouTube Data API v3 metadata provider.

use super::{MetadataProvider, VideoMetadata};
use crate::error::{Result, SporreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, instrument};

const VIDEOS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/videos";

/// Metadata provider backed by the YouTube Data API.
pub struct YouTubeDataApi {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl YouTubeDataApi {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl MetadataProvider for YouTubeDataApi {
    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str) -> Result<VideoMetadata> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            SporreError::Metadata(
                "YouTube API key not configured (set YOUTUBE_API_KEY or youtube.api_key)"
                    .to_string(),
            )
        })?;

        let response = self
            .http
            .get(VIDEOS_ENDPOINT)
            .query(&[
                ("part", "snippet,contentDetails"),
                ("id", video_id),
                ("key", api_key),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        debug!("Fetched metadata for {}", video_id);

        parse_video_response(&body, video_id)
    }
}

/// Extract metadata from a Data API `videos.list` response.
fn parse_video_response(body: &Value, video_id: &str) -> Result<VideoMetadata> {
    let item = body
        .get("items")
        .and_then(|items| items.as_array())
        .and_then(|items| items.first())
        .ok_or_else(|| SporreError::MetadataNotFound(video_id.to_string()))?;

    let snippet = &item["snippet"];
    let content = &item["contentDetails"];

    let title = snippet["title"].as_str().unwrap_or("Unknown Title").to_string();

    let published_at = snippet["publishedAt"]
        .as_str()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc));

    let tags = snippet["tags"]
        .as_array()
        .map(|tags| {
            tags.iter()
                .filter_map(|t| t.as_str())
                .map(|t| t.to_string())
                .collect()
        })
        .unwrap_or_default();

    Ok(VideoMetadata {
        title,
        description: snippet["description"].as_str().map(|s| s.to_string()),
        channel: snippet["channelTitle"].as_str().map(|s| s.to_string()),
        published_at,
        tags,
        duration: content["duration"].as_str().map(|s| s.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_response() {
        let body = json!({
            "items": [{
                "snippet": {
                    "title": "Intro to Ferrous Oxide",
                    "description": "A long talk.",
                    "channelTitle": "Rust Talks",
                    "publishedAt": "2023-06-01T12:00:00Z",
                    "tags": ["rust", "talk"]
                },
                "contentDetails": {
                    "duration": "PT1H2M3S"
                }
            }]
        });

        let meta = parse_video_response(&body, "abc123").unwrap();
        assert_eq!(meta.title, "Intro to Ferrous Oxide");
        assert_eq!(meta.channel.as_deref(), Some("Rust Talks"));
        assert_eq!(meta.tags, vec!["rust".to_string(), "talk".to_string()]);
        assert_eq!(meta.duration.as_deref(), Some("PT1H2M3S"));
        assert!(meta.published_at.is_some());
    }

    #[test]
    fn test_parse_missing_optional_fields() {
        let body = json!({
            "items": [{
                "snippet": {"title": "Bare"},
                "contentDetails": {}
            }]
        });

        let meta = parse_video_response(&body, "abc123").unwrap();
        assert_eq!(meta.title, "Bare");
        assert!(meta.description.is_none());
        assert!(meta.tags.is_empty());
        assert!(meta.duration.is_none());
    }

    #[test]
    fn test_empty_items_is_not_found() {
        let body = json!({"items": []});
        let err = parse_video_response(&body, "abc123").unwrap_err();
        assert!(matches!(err, SporreError::MetadataNotFound(id) if id == "abc123"));
    }
}
