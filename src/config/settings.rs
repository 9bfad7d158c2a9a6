//! Configuration settings for Jamak.

use crate::refine::NeighborContext;
use crate::youtube::SubtitleFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable consulted when no YouTube API key is configured.
pub const YOUTUBE_API_KEY_ENV: &str = "YOUTUBE_API_KEY";
/// Environment variable consulted when no YouTube OAuth token is configured.
pub const YOUTUBE_ACCESS_TOKEN_ENV: &str = "YOUTUBE_ACCESS_TOKEN";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub youtube: YoutubeSettings,
    pub refinement: RefinementSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Language model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Chat model used for correction, refinement and recipe extraction.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// HTTP timeout for a single OpenAI request.
    pub timeout_seconds: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            timeout_seconds: crate::openai::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl LlmSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// YouTube Data API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    /// API key for public endpoints (video metadata, caption listing).
    pub api_key: Option<String>,
    /// OAuth bearer token. Caption download requires it.
    pub access_token: Option<String>,
    /// Caption languages in priority order.
    pub preferred_languages: Vec<String>,
    /// Subtitle format requested when downloading a caption track.
    pub caption_format: SubtitleFormat,
    /// Base URL of the Data API.
    pub api_base_url: String,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            access_token: None,
            preferred_languages: vec!["ko".to_string(), "en".to_string()],
            caption_format: SubtitleFormat::Srt,
            api_base_url: "https://www.googleapis.com/youtube/v3".to_string(),
        }
    }
}

impl YoutubeSettings {
    /// API key from config, falling back to `YOUTUBE_API_KEY`.
    pub fn resolved_api_key(&self) -> Option<String> {
        non_empty(self.api_key.clone()).or_else(|| non_empty(std::env::var(YOUTUBE_API_KEY_ENV).ok()))
    }

    /// Access token from config, falling back to `YOUTUBE_ACCESS_TOKEN`.
    pub fn resolved_access_token(&self) -> Option<String> {
        non_empty(self.access_token.clone())
            .or_else(|| non_empty(std::env::var(YOUTUBE_ACCESS_TOKEN_ENV).ok()))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Transcript refinement settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinementSettings {
    /// Maximum concurrent LLM calls per refinement pass.
    pub max_concurrent: usize,
    /// Per-call timeout. Unset leaves it to the HTTP client timeout.
    pub request_timeout_seconds: Option<u64>,
    /// Which text neighbors contribute in the contextual pass.
    pub neighbor_context: NeighborContext,
}

impl Default for RefinementSettings {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            request_timeout_seconds: None,
            neighbor_context: NeighborContext::Original,
        }
    }
}

impl RefinementSettings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds.map(Duration::from_secs)
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
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
            .map_err(|e| crate::error::JamakError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jamak")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }
}
