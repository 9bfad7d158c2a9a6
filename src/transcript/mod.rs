//! Transcript models, subtitle parsing and output formatting.

mod format;
mod models;
mod subtitles;

pub use format::{format_transcript, format_transcript_with, OutputFormat, TranscriptExport};
pub use models::{Transcript, TranscriptSegment};
pub use subtitles::{
    detect_subtitle_format, parse_sbv, parse_srt, parse_subtitles, parse_vtt,
};

use crate::error::{JamakError, Result};

/// Build a transcript of the requested shape from downloaded caption text.
///
/// The subtitle format (SRT, WebVTT or SBV) is detected from the content.
/// Segmented mode requires timed subtitles. Full-text mode strips cue
/// numbers and timing lines so only the spoken text reaches the corrector.
pub fn transcript_from_caption(content: &str, segmented: bool) -> Result<Transcript> {
    match detect_subtitle_format(content) {
        Some(format) => {
            let segments = Transcript::Segments(parse_subtitles(content, format)?);
            if segmented {
                Ok(segments)
            } else {
                Ok(Transcript::Text(segments.full_text()))
            }
        }
        None if segmented => Err(JamakError::InvalidInput(
            "segmented mode needs timed subtitles (SRT, WebVTT or SBV)".to_string(),
        )),
        None => Ok(Transcript::Text(content.trim().to_string())),
    }
}
