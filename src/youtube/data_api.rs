//! YouTube Data API v3 client.

use super::{
    CaptionCatalogClient, CaptionFetcher, CaptionTrack, SubtitleFormat, VideoId, VideoMetadata,
    VideoMetadataClient,
};
use crate::config::YoutubeSettings;
use crate::error::{JamakError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Thin client over the `videos` and `captions` resources.
pub struct YoutubeDataApi {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    access_token: Option<String>,
}

impl YoutubeDataApi {
    /// Create a client from settings, resolving credentials from the environment.
    pub fn from_settings(settings: &YoutubeSettings) -> Result<Self> {
        Self::new(
            &settings.api_base_url,
            settings.resolved_api_key(),
            settings.resolved_access_token(),
        )
    }

    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        access_token: Option<String>,
    ) -> Result<Self> {
        if api_key.is_none() && access_token.is_none() {
            return Err(JamakError::Config(
                "No YouTube credentials. Set YOUTUBE_API_KEY or YOUTUBE_ACCESS_TOKEN.".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| JamakError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            access_token,
        })
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.get(format!("{}/{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            builder = builder.query(&[("key", key.as_str())]);
        }
        if let Some(token) = &self.access_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| JamakError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let reason = serde_json::from_str::<ApiErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        Err(JamakError::Transport(format!("HTTP {}: {}", status, reason)))
    }
}

#[async_trait]
impl CaptionCatalogClient for YoutubeDataApi {
    #[instrument(skip(self), fields(video_id = %video_id))]
    async fn list_captions(&self, video_id: &VideoId) -> Result<Vec<CaptionTrack>> {
        let builder = self
            .request("captions")
            .query(&[("part", "snippet"), ("videoId", video_id.as_str())]);

        let response: CaptionListResponse = self.send(builder).await?.json().await?;
        let tracks: Vec<CaptionTrack> = response.items.into_iter().map(Into::into).collect();

        debug!("Catalog lists {} caption tracks", tracks.len());
        Ok(tracks)
    }
}

#[async_trait]
impl CaptionFetcher for YoutubeDataApi {
    #[instrument(skip(self))]
    async fn download_caption(&self, track_id: &str, format: SubtitleFormat) -> Result<String> {
        let builder = self
            .request(&format!("captions/{}", track_id))
            .query(&[("tfmt", format.as_tfmt())]);

        let text = self.send(builder).await?.text().await?;
        debug!("Downloaded {} bytes of {} captions", text.len(), format);
        Ok(text)
    }
}

#[async_trait]
impl VideoMetadataClient for YoutubeDataApi {
    #[instrument(skip(self), fields(video_id = %video_id))]
    async fn fetch_metadata(&self, video_id: &VideoId) -> Result<Option<VideoMetadata>> {
        let builder = self
            .request("videos")
            .query(&[("part", "snippet"), ("id", video_id.as_str())]);

        let response: VideoListResponse = self.send(builder).await?.json().await?;
        Ok(response.into_metadata())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct CaptionListResponse {
    #[serde(default)]
    items: Vec<CaptionResource>,
}

#[derive(Debug, Deserialize)]
struct CaptionResource {
    id: String,
    snippet: CaptionSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionSnippet {
    language: String,
    #[serde(default)]
    track_kind: Option<String>,
}

impl From<CaptionResource> for CaptionTrack {
    fn from(resource: CaptionResource) -> Self {
        let is_auto_generated = resource
            .snippet
            .track_kind
            .as_deref()
            .is_some_and(|kind| kind.eq_ignore_ascii_case("asr"));

        CaptionTrack {
            language_code: resource.snippet.language,
            track_id: resource.id,
            is_auto_generated,
        }
    }
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoResource>,
}

#[derive(Debug, Deserialize)]
struct VideoResource {
    id: String,
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    channel_title: Option<String>,
    published_at: Option<String>,
}

impl VideoListResponse {
    fn into_metadata(self) -> Option<VideoMetadata> {
        self.items.into_iter().next().map(|video| VideoMetadata {
            id: video.id,
            title: video.snippet.title,
            description: video.snippet.description,
            channel: video.snippet.channel_title,
            published_at: video.snippet.published_at,
        })
    }
}
