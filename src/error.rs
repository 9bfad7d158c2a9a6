//! Error types for Jamak.

use crate::refine::RefineError;
use crate::youtube::SelectionError;
use thiserror::Error;

/// Library-level error type for Jamak operations.
#[derive(Error, Debug)]
pub enum JamakError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid video URL: {0}")]
    InvalidUrl(String),

    #[error("No eligible captions: {0}")]
    CaptionNotFound(#[from] SelectionError),

    #[error("YouTube API request failed: {0}")]
    Transport(String),

    #[error(transparent)]
    Refine(#[from] RefineError),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Subtitle parse error: {0}")]
    Subtitle(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Jamak operations.
pub type Result<T> = std::result::Result<T, JamakError>;
