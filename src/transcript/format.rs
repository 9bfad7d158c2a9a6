//! Transcript output formatting (text, JSON, SRT, VTT).

use super::{Transcript, TranscriptSegment};
use crate::error::{JamakError, Result};
use serde::Serialize;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
    Srt,
    Vtt,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "srt" => Ok(OutputFormat::Srt),
            "vtt" | "webvtt" => Ok(OutputFormat::Vtt),
            _ => Err(format!("Unknown format: {}. Use text, json, srt, or vtt.", s)),
        }
    }
}

/// JSON-serializable transcript for export.
#[derive(Debug, Serialize)]
pub struct TranscriptExport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<&'a str>,
    pub transcript: &'a Transcript,
}

/// Format a transcript for output.
///
/// SRT and VTT need timing, so they reject full-text transcripts.
pub fn format_transcript(transcript: &Transcript, format: OutputFormat) -> Result<String> {
    format_transcript_with(transcript, format, None, None)
}

/// Like [`format_transcript`], labelling JSON output with the video and language.
pub fn format_transcript_with(
    transcript: &Transcript,
    format: OutputFormat,
    video_id: Option<&str>,
    language: Option<&str>,
) -> Result<String> {
    match (format, transcript) {
        (OutputFormat::Text, _) => Ok(transcript.full_text()),
        (OutputFormat::Json, _) => {
            let export = TranscriptExport {
                video_id,
                language,
                transcript,
            };
            Ok(serde_json::to_string_pretty(&export)?)
        }
        (OutputFormat::Srt, Transcript::Segments(segments)) => Ok(format_srt(segments)),
        (OutputFormat::Vtt, Transcript::Segments(segments)) => Ok(format_vtt(segments)),
        (_, Transcript::Text(_)) => Err(JamakError::InvalidInput(
            "SRT and VTT output need a segmented transcript".to_string(),
        )),
    }
}

/// End time for a cue: its own, else the next cue's start, else its start.
fn cue_end(segments: &[TranscriptSegment], i: usize) -> f64 {
    segments[i]
        .end_seconds
        .or_else(|| segments.get(i + 1).map(|s| s.start_seconds))
        .unwrap_or(segments[i].start_seconds)
}

/// Format as SRT (SubRip).
fn format_srt(segments: &[TranscriptSegment]) -> String {
    let mut output = String::new();

    for (i, segment) in segments.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_timestamp(segment.start_seconds),
            format_srt_timestamp(cue_end(segments, i))
        ));
        output.push_str(&segment.text);
        output.push_str("\n\n");
    }

    output
}

/// Format as WebVTT.
fn format_vtt(segments: &[TranscriptSegment]) -> String {
    let mut output = String::from("WEBVTT\n\n");

    for (i, segment) in segments.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_vtt_timestamp(segment.start_seconds),
            format_vtt_timestamp(cue_end(segments, i))
        ));
        output.push_str(&segment.text);
        output.push_str("\n\n");
    }

    output
}

fn split_millis(seconds: f64) -> (u64, u64, u64, u64) {
    let total_ms = (seconds * 1000.0).round() as u64;
    (
        total_ms / 3_600_000,
        (total_ms % 3_600_000) / 60_000,
        (total_ms % 60_000) / 1000,
        total_ms % 1000,
    )
}

/// Format timestamp for SRT (00:00:00,000).
fn format_srt_timestamp(seconds: f64) -> String {
    let (hours, minutes, secs, ms) = split_millis(seconds);
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, ms)
}

/// Format timestamp for VTT (00:00:00.000).
fn format_vtt_timestamp(seconds: f64) -> String {
    let (hours, minutes, secs, ms) = split_millis(seconds);
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_transcript() -> Transcript {
        Transcript::Segments(vec![
            TranscriptSegment::new(0.0, Some(2.5), "Hello world."),
            TranscriptSegment::new(2.5, None, "This is a test."),
        ])
    }

    #[test]
    fn test_format_json() {
        let json = format_transcript_with(
            &sample_transcript(),
            OutputFormat::Json,
            Some("test123"),
            Some("en"),
        )
        .unwrap();
        assert!(json.contains("\"video_id\": \"test123\""));
        assert!(json.contains("\"mode\": \"segments\""));
        assert!(json.contains("Hello world."));
    }

    #[test]
    fn test_format_srt() {
        let srt = format_transcript(&sample_transcript(), OutputFormat::Srt).unwrap();
        assert!(srt.contains("1\n00:00:00,000 --> 00:00:02,500\nHello world."));
        // Missing end falls back to the start.
        assert!(srt.contains("2\n00:00:02,500 --> 00:00:02,500\nThis is a test."));
    }

    #[test]
    fn test_format_vtt() {
        let vtt = format_transcript(&sample_transcript(), OutputFormat::Vtt).unwrap();
        assert!(vtt.starts_with("WEBVTT"));
        assert!(vtt.contains("00:00:00.000 --> 00:00:02.500"));
    }

    #[test]
    fn test_text_transcript_rejects_timed_formats() {
        let flat = Transcript::Text("plain".to_string());
        assert_eq!(format_transcript(&flat, OutputFormat::Text).unwrap(), "plain");
        assert!(matches!(
            format_transcript(&flat, OutputFormat::Srt),
            Err(JamakError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("webvtt".parse::<OutputFormat>().unwrap(), OutputFormat::Vtt);
        assert!("docx".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_srt_timestamp() {
        assert_eq!(format_srt_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_srt_timestamp(61.5), "00:01:01,500");
        assert_eq!(format_srt_timestamp(3661.123), "01:01:01,123");
    }
}
