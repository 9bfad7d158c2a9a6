//! Caption retrieval boundary.
//!
//! `CaptionService` never returns an error: every failure mode becomes a
//! variant of [`CaptionOutcome`] or [`DescriptionOutcome`] so callers can tell
//! "no captions" from "malformed URL" from "transient fetch failure".

use super::{
    extract_video_id, select_caption, CaptionCatalogClient, CaptionFetcher, SelectionError,
    SubtitleFormat, VideoMetadata, VideoMetadataClient, DEFAULT_PREFERRED_LANGUAGES,
};
use crate::error::JamakError;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Result of a caption lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptionOutcome {
    Found {
        language: String,
        track_id: String,
        content: String,
    },
    /// The video has no eligible caption track.
    NotFound(SelectionError),
    InvalidUrl(String),
    /// Transport or authorization failure from the YouTube API.
    Failed(String),
}

impl CaptionOutcome {
    /// `(language, caption text)` on success, `(None, reason)` otherwise.
    pub fn into_pair(self) -> (Option<String>, String) {
        match self {
            CaptionOutcome::Found {
                language, content, ..
            } => (Some(language), content),
            other => (None, other.message()),
        }
    }

    /// Human-readable description of a non-success outcome.
    pub fn message(&self) -> String {
        match self {
            CaptionOutcome::Found { language, .. } => format!("Found {} captions", language),
            CaptionOutcome::NotFound(reason) => format!("No captions available: {}", reason),
            CaptionOutcome::InvalidUrl(reason) => format!("Invalid video URL: {}", reason),
            CaptionOutcome::Failed(reason) => format!("Failed to fetch captions: {}", reason),
        }
    }
}

/// Result of a video metadata lookup.
#[derive(Debug, Clone)]
pub enum DescriptionOutcome {
    Found(VideoMetadata),
    NotFound(String),
    InvalidUrl(String),
    Failed(String),
}

impl DescriptionOutcome {
    /// The description on success, a user-facing message otherwise.
    pub fn message(&self) -> String {
        match self {
            DescriptionOutcome::Found(metadata) => metadata.description.clone(),
            DescriptionOutcome::NotFound(id) => format!("Video {} could not be found.", id),
            DescriptionOutcome::InvalidUrl(reason) => format!("Invalid video URL: {}", reason),
            DescriptionOutcome::Failed(reason) => {
                format!("Failed to fetch video details: {}", reason)
            }
        }
    }
}

/// Ties URL parsing and caption selection to the YouTube collaborators.
pub struct CaptionService {
    catalog: Arc<dyn CaptionCatalogClient>,
    fetcher: Arc<dyn CaptionFetcher>,
    metadata: Arc<dyn VideoMetadataClient>,
    preferred_languages: Vec<String>,
    format: SubtitleFormat,
}

impl CaptionService {
    pub fn new(
        catalog: Arc<dyn CaptionCatalogClient>,
        fetcher: Arc<dyn CaptionFetcher>,
        metadata: Arc<dyn VideoMetadataClient>,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            metadata,
            preferred_languages: DEFAULT_PREFERRED_LANGUAGES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            format: SubtitleFormat::Srt,
        }
    }

    /// Build a service whose three collaborators are the same client.
    pub fn from_client<C>(client: Arc<C>) -> Self
    where
        C: CaptionCatalogClient + CaptionFetcher + VideoMetadataClient + 'static,
    {
        Self::new(client.clone(), client.clone(), client)
    }

    /// Set the language preference order. An empty list keeps the default.
    pub fn with_preferred_languages(mut self, languages: Vec<String>) -> Self {
        if !languages.is_empty() {
            self.preferred_languages = languages;
        }
        self
    }

    pub fn with_format(mut self, format: SubtitleFormat) -> Self {
        self.format = format;
        self
    }

    pub fn preferred_languages(&self) -> &[String] {
        &self.preferred_languages
    }

    /// Fetch the preferred human-authored caption for a video URL.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_caption(&self, url: &str) -> CaptionOutcome {
        let video_id = match extract_video_id(url) {
            Ok(id) => id,
            Err(e) => return CaptionOutcome::InvalidUrl(error_detail(e)),
        };

        let catalog = match self.catalog.list_captions(&video_id).await {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!("Caption listing failed for {}: {}", video_id, e);
                return CaptionOutcome::Failed(error_detail(e));
            }
        };

        let track = match select_caption(&catalog, self.preferred_languages.as_slice()) {
            Ok(track) => track,
            Err(reason) => {
                info!("No eligible captions for {}: {}", video_id, reason);
                return CaptionOutcome::NotFound(reason);
            }
        };

        info!(
            "Selected {} caption track {} for {}",
            track.language_code, track.track_id, video_id
        );

        match self.fetcher.download_caption(&track.track_id, self.format).await {
            Ok(content) => CaptionOutcome::Found {
                language: track.language_code.clone(),
                track_id: track.track_id.clone(),
                content,
            },
            Err(e) => {
                warn!("Caption download failed for {}: {}", track.track_id, e);
                CaptionOutcome::Failed(error_detail(e))
            }
        }
    }

    /// Fetch the title, channel and description of a video.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_video_description(&self, url: &str) -> DescriptionOutcome {
        let video_id = match extract_video_id(url) {
            Ok(id) => id,
            Err(e) => return DescriptionOutcome::InvalidUrl(error_detail(e)),
        };

        match self.metadata.fetch_metadata(&video_id).await {
            Ok(Some(metadata)) => DescriptionOutcome::Found(metadata),
            Ok(None) => DescriptionOutcome::NotFound(video_id.to_string()),
            Err(e) => {
                warn!("Metadata request failed for {}: {}", video_id, e);
                DescriptionOutcome::Failed(error_detail(e))
            }
        }
    }
}

/// Strip the variant prefix so outcome messages don't repeat it.
fn error_detail(error: JamakError) -> String {
    match error {
        JamakError::InvalidUrl(msg) | JamakError::Transport(msg) => msg,
        other => other.to_string(),
    }
}
