//! YouTube caption retrieval for Jamak.
//!
//! The Data API is hidden behind three collaborator traits so caption
//! selection and the retrieval boundary can be exercised without a network.

mod data_api;
mod selector;
mod service;
mod video_id;

pub use data_api::YoutubeDataApi;
pub use selector::{select_caption, SelectionError, DEFAULT_PREFERRED_LANGUAGES};
pub use service::{CaptionOutcome, CaptionService, DescriptionOutcome};
pub use video_id::{extract_video_id, VideoId};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Subtitle formats the caption download endpoint can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    #[default]
    Srt,
    Vtt,
    Sbv,
}

impl SubtitleFormat {
    /// Value of the `tfmt` query parameter.
    pub fn as_tfmt(&self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::Vtt => "vtt",
            SubtitleFormat::Sbv => "sbv",
        }
    }
}

impl std::fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_tfmt())
    }
}

impl std::str::FromStr for SubtitleFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "srt" => Ok(SubtitleFormat::Srt),
            "vtt" | "webvtt" => Ok(SubtitleFormat::Vtt),
            "sbv" => Ok(SubtitleFormat::Sbv),
            _ => Err(format!("Unknown subtitle format: {}. Use srt, vtt, or sbv.", s)),
        }
    }
}

/// One caption track listed for a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionTrack {
    /// BCP-47 language code (e.g. "ko", "en").
    pub language_code: String,
    /// Opaque track id used for download.
    pub track_id: String,
    /// True for ASR (machine generated) tracks.
    pub is_auto_generated: bool,
}

impl CaptionTrack {
    pub fn new(language_code: &str, track_id: &str, is_auto_generated: bool) -> Self {
        Self {
            language_code: language_code.to_string(),
            track_id: track_id.to_string(),
            is_auto_generated,
        }
    }
}

/// Metadata about a video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    pub description: String,
    pub channel: Option<String>,
    pub published_at: Option<String>,
}

impl VideoMetadata {
    /// Canonical watch URL.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

/// Lists the caption tracks available for a video.
#[async_trait]
pub trait CaptionCatalogClient: Send + Sync {
    /// Tracks in the order the catalog returns them. May be empty.
    async fn list_captions(&self, video_id: &VideoId) -> Result<Vec<CaptionTrack>>;
}

/// Downloads the content of a caption track.
#[async_trait]
pub trait CaptionFetcher: Send + Sync {
    async fn download_caption(&self, track_id: &str, format: SubtitleFormat) -> Result<String>;
}

/// Fetches video metadata.
#[async_trait]
pub trait VideoMetadataClient: Send + Sync {
    /// `Ok(None)` when the video does not exist.
    async fn fetch_metadata(&self, video_id: &VideoId) -> Result<Option<VideoMetadata>>;
}
