//! Subtitle parsing for the formats the caption endpoint serves: SRT, WebVTT and SBV.
//!
//! Cues are separated by blank lines, including lines holding only
//! whitespace. Cues without text are kept as blank segments so that cue
//! numbering and timing survive a refine-and-write round trip.

use super::TranscriptSegment;
use crate::error::{JamakError, Result};
use crate::youtube::SubtitleFormat;
use regex::Regex;
use std::sync::OnceLock;

fn timestamp() -> &'static Regex {
    static TIMESTAMP: OnceLock<Regex> = OnceLock::new();
    TIMESTAMP.get_or_init(|| {
        // Hours are optional: WebVTT and SBV may write "mm:ss.ttt".
        Regex::new(r"^(?:(\d+):)?(\d{1,2}):(\d{2})[,.](\d{1,3})$")
            .expect("subtitle timestamp pattern is valid")
    })
}

fn markup() -> &'static Regex {
    static MARKUP: OnceLock<Regex> = OnceLock::new();
    MARKUP.get_or_init(|| Regex::new(r"</?[^>]+>").expect("cue markup pattern is valid"))
}

/// Guess the subtitle format of downloaded or local caption text.
///
/// Returns `None` for plain prose.
pub fn detect_subtitle_format(input: &str) -> Option<SubtitleFormat> {
    let normalized = normalize(input);
    if normalized.trim_start().starts_with("WEBVTT") {
        return Some(SubtitleFormat::Vtt);
    }

    let mut lines = normalized.lines().filter(|l| !l.trim().is_empty()).take(5);
    lines.find_map(|line| {
        if parse_arrow_timing(line).is_some() {
            Some(SubtitleFormat::Srt)
        } else if parse_sbv_timing(line).is_some() {
            Some(SubtitleFormat::Sbv)
        } else {
            None
        }
    })
}

/// Parse subtitle text of a known format into ordered segments.
pub fn parse_subtitles(input: &str, format: SubtitleFormat) -> Result<Vec<TranscriptSegment>> {
    match format {
        SubtitleFormat::Srt => parse_srt(input),
        SubtitleFormat::Vtt => parse_vtt(input),
        SubtitleFormat::Sbv => parse_sbv(input),
    }
}

/// Parse SRT text. The cue number, when present, is kept as the `index` extra field.
pub fn parse_srt(input: &str) -> Result<Vec<TranscriptSegment>> {
    let normalized = normalize(input);
    let mut segments = Vec::new();

    for block in cue_blocks(&normalized) {
        let (id, timing, text) = split_cue(&block)?;
        let (start, end) = parse_arrow_timing(timing).ok_or_else(|| invalid_timing(timing))?;

        let mut segment = TranscriptSegment::new(start, Some(end), cue_text(text));
        if let Some(index) = id.and_then(|id| id.parse::<u64>().ok()) {
            segment = segment.with_extra("index", index);
        }
        segments.push(segment);
    }

    Ok(segments)
}

/// Parse WebVTT text.
///
/// The header, `NOTE`, `STYLE` and `REGION` blocks are skipped, cue settings
/// after the end time are ignored and inline markup is stripped. A cue
/// identifier is kept as the `identifier` extra field.
pub fn parse_vtt(input: &str) -> Result<Vec<TranscriptSegment>> {
    let normalized = normalize(input);
    let mut blocks = cue_blocks(&normalized).into_iter().peekable();

    match blocks.peek() {
        Some(header) if header[0].trim_start().starts_with("WEBVTT") => {
            blocks.next();
        }
        _ => {
            return Err(JamakError::Subtitle(
                "WebVTT input must start with a WEBVTT header".to_string(),
            ))
        }
    }

    let mut segments = Vec::new();
    for block in blocks {
        let first = block[0].trim_start();
        if ["NOTE", "STYLE", "REGION"]
            .iter()
            .any(|kind| first == *kind || first.starts_with(&format!("{} ", kind)))
        {
            continue;
        }

        let (id, timing, text) = split_cue(&block)?;
        let (start, end) = parse_arrow_timing(timing).ok_or_else(|| invalid_timing(timing))?;

        let text = markup().replace_all(&cue_text(text), "").into_owned();
        let mut segment = TranscriptSegment::new(start, Some(end), text);
        if let Some(id) = id {
            segment = segment.with_extra("identifier", id);
        }
        segments.push(segment);
    }

    Ok(segments)
}

/// Parse SBV (YouTube SubViewer) text: a `start,end` line followed by text.
pub fn parse_sbv(input: &str) -> Result<Vec<TranscriptSegment>> {
    let normalized = normalize(input);
    let mut segments = Vec::new();

    for block in cue_blocks(&normalized) {
        let timing = block[0];
        let (start, end) = parse_sbv_timing(timing).ok_or_else(|| invalid_timing(timing))?;
        segments.push(TranscriptSegment::new(start, Some(end), cue_text(&block[1..])));
    }

    Ok(segments)
}

fn normalize(input: &str) -> String {
    input.trim_start_matches('\u{feff}').replace("\r\n", "\n")
}

/// Group lines into cues; any whitespace-only line ends a cue.
fn cue_blocks(input: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in input.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

/// Split a cue into optional identifier, timing line and text lines.
fn split_cue<'a, 'b>(block: &'b [&'a str]) -> Result<(Option<&'a str>, &'a str, &'b [&'a str])> {
    let first = block[0];
    if first.contains("-->") {
        return Ok((None, first, &block[1..]));
    }

    match block.get(1) {
        Some(&timing) => Ok((Some(first.trim()), timing, &block[2..])),
        None => Err(JamakError::Subtitle(format!(
            "cue '{}' has no timing line",
            first.trim()
        ))),
    }
}

fn cue_text(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|l| l.trim())
        .collect::<Vec<_>>()
        .join("\n")
}

fn invalid_timing(line: &str) -> JamakError {
    JamakError::Subtitle(format!("invalid timing line: '{}'", line.trim()))
}

/// `start --> end [cue settings]`, as used by SRT and WebVTT.
fn parse_arrow_timing(line: &str) -> Option<(f64, f64)> {
    let (start, rest) = line.split_once("-->")?;
    let end = rest.split_whitespace().next()?;
    Some((parse_timestamp(start.trim())?, parse_timestamp(end)?))
}

/// `start,end` with dotted milliseconds, as used by SBV.
fn parse_sbv_timing(line: &str) -> Option<(f64, f64)> {
    let (start, end) = line.trim().split_once(',')?;
    Some((parse_timestamp(start.trim())?, parse_timestamp(end.trim())?))
}

fn parse_timestamp(raw: &str) -> Option<f64> {
    let caps = timestamp().captures(raw)?;

    let field = |i: usize| -> f64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0)
    };
    // "5" means 500ms, "05" means 50ms.
    let fraction = &caps[4];
    let millis = field(4) * 10f64.powi(3 - fraction.len() as i32);

    Some(field(1) * 3600.0 + field(2) * 60.0 + field(3) + millis / 1000.0)
}
