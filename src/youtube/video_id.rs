//! Video identifier extraction.

use crate::error::{JamakError, Result};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// A YouTube video identifier taken from a URL's `v` query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    /// Validate a raw identifier against the platform's id grammar.
    pub fn parse(raw: &str) -> Result<Self> {
        if id_grammar().is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(JamakError::InvalidUrl(format!(
                "'{}' is not a valid video identifier",
                raw
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn id_grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        // Video ids are URL-safe base64 characters.
        Regex::new(r"^[A-Za-z0-9_-]+$").expect("video id pattern is valid")
    })
}

/// Extract the video id from a watch URL.
///
/// Only the `v` query parameter is consulted; the first occurrence wins.
pub fn extract_video_id(url: &str) -> Result<VideoId> {
    let parsed = Url::parse(url.trim())
        .map_err(|e| JamakError::InvalidUrl(format!("{}: {}", url, e)))?;

    let raw = parsed
        .query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| JamakError::InvalidUrl(format!("{}: missing 'v' query parameter", url)))?;

    VideoId::parse(&raw)
}
