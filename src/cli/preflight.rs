//! Pre-flight checks before expensive operations.
//!
//! Validates that credentials are available before starting operations
//! that would otherwise fail midway.

use crate::config::YoutubeSettings;
use crate::error::{JamakError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Caption lookup requires YouTube credentials.
    Caption,
    /// Refinement and recipe extraction require an OpenAI API key.
    Refine,
    /// Fetching and then refining requires both.
    CaptionAndRefine,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, youtube: &YoutubeSettings) -> Result<()> {
    match operation {
        Operation::Caption => {
            check_youtube_credentials(youtube)?;
        }
        Operation::Refine => {
            check_api_key()?;
        }
        Operation::CaptionAndRefine => {
            check_youtube_credentials(youtube)?;
            check_api_key()?;
        }
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(JamakError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(JamakError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check if an API key or OAuth token is available for the Data API.
fn check_youtube_credentials(youtube: &YoutubeSettings) -> Result<()> {
    if youtube.resolved_api_key().is_some() || youtube.resolved_access_token().is_some() {
        Ok(())
    } else {
        Err(JamakError::Config(
            "No YouTube credentials. Set YOUTUBE_API_KEY or youtube.api_key in the config file."
                .to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_youtube_key_passes() {
        let youtube = YoutubeSettings {
            api_key: Some("configured-key".to_string()),
            ..Default::default()
        };
        assert!(check(Operation::Caption, &youtube).is_ok());
    }
}
