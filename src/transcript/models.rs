//! Data models for transcripts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A timestamped span of caption text.
///
/// Only `text` is rewritten by refinement. Timing fields and any extra
/// metadata carried in `extra` pass through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Caption text.
    pub text: String,
    /// Start time in seconds.
    pub start_seconds: f64,
    /// End time in seconds, if the source provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_seconds: Option<f64>,
    /// Other metadata (cue index, speaker, ...) carried opaquely.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TranscriptSegment {
    /// Create a new transcript segment.
    pub fn new(start_seconds: f64, end_seconds: Option<f64>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start_seconds,
            end_seconds,
            extra: Map::new(),
        }
    }

    /// Attach an opaque metadata field.
    pub fn with_extra(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// Copy of this segment with different text and identical metadata.
    pub fn with_text(&self, text: String) -> Self {
        Self {
            text,
            start_seconds: self.start_seconds,
            end_seconds: self.end_seconds,
            extra: self.extra.clone(),
        }
    }
}

/// Caption text in one of two shapes.
///
/// The shape is chosen once, at the pipeline's entry, and refinement output
/// always has the same shape as its input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "content", rename_all = "lowercase")]
pub enum Transcript {
    /// A single full-text document.
    Text(String),
    /// Ordered segments; order defines previous/next context.
    Segments(Vec<TranscriptSegment>),
}

impl Transcript {
    /// Plain text of the transcript, non-blank segments joined by newlines.
    pub fn full_text(&self) -> String {
        match self {
            Transcript::Text(text) => text.clone(),
            Transcript::Segments(segments) => segments
                .iter()
                .map(|s| s.text.as_str())
                .filter(|text| !text.trim().is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Number of units refinement will operate on.
    pub fn len(&self) -> usize {
        match self {
            Transcript::Text(_) => 1,
            Transcript::Segments(segments) => segments.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Transcript::Text(text) => text.is_empty(),
            Transcript::Segments(segments) => segments.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_text_keeps_metadata() {
        let segment = TranscriptSegment::new(1.5, Some(3.0), "hello")
            .with_extra("index", 7)
            .with_extra("speaker", "chef");

        let rewritten = segment.with_text("Hello.".to_string());
        assert_eq!(rewritten.text, "Hello.");
        assert_eq!(rewritten.start_seconds, 1.5);
        assert_eq!(rewritten.end_seconds, Some(3.0));
        assert_eq!(rewritten.extra, segment.extra);
    }

    #[test]
    fn test_segment_json_passes_extra_fields_through() {
        let json = r#"{"text": "A", "start_seconds": 0.0, "duration": 2.5, "speaker": "host"}"#;
        let segment: TranscriptSegment = serde_json::from_str(json).unwrap();

        assert_eq!(segment.end_seconds, None);
        assert_eq!(segment.extra.get("duration"), Some(&Value::from(2.5)));

        let back = serde_json::to_value(&segment).unwrap();
        assert_eq!(back["speaker"], "host");
        assert!(back.get("end_seconds").is_none());
    }

    #[test]
    fn test_full_text() {
        let transcript = Transcript::Segments(vec![
            TranscriptSegment::new(0.0, Some(5.0), "First"),
            TranscriptSegment::new(5.0, Some(10.0), "Second"),
        ]);
        assert_eq!(transcript.full_text(), "First\nSecond");
        assert_eq!(transcript.len(), 2);
        assert_eq!(Transcript::Text("x".to_string()).len(), 1);
    }
}
