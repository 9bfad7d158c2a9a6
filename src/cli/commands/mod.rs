//! CLI command implementations.

mod caption;
mod config;
mod describe;
mod doctor;
mod recipe;
mod refine;

pub use caption::run_caption;
pub use config::run_config;
pub use describe::run_describe;
pub use doctor::run_doctor;
pub use recipe::run_recipe;
pub use refine::run_refine;

use crate::cli::interrupt::InterruptGuard;
use crate::cli::{Output, RefineArgs};
use crate::config::{Prompts, Settings};
use crate::refine::{OpenAiLanguageModel, TranscriptRefinementPipeline};
use crate::transcript::{OutputFormat, Transcript};
use crate::youtube::{CaptionService, YoutubeDataApi};
use anyhow::Result;
use std::sync::Arc;

/// Load prompt templates, honoring the custom prompt directory.
pub(crate) fn load_prompts(settings: &Settings) -> Result<Arc<Prompts>> {
    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    Ok(Arc::new(prompts))
}

/// Build a caption service backed by the YouTube Data API.
///
/// `languages` overrides the configured preference order when non-empty.
pub(crate) fn caption_service(settings: &Settings, languages: &[String]) -> Result<CaptionService> {
    let api = Arc::new(YoutubeDataApi::from_settings(&settings.youtube)?);

    let languages = if languages.is_empty() {
        settings.youtube.preferred_languages.clone()
    } else {
        languages.to_vec()
    };

    Ok(CaptionService::from_client(api)
        .with_preferred_languages(languages)
        .with_format(settings.youtube.caption_format))
}

/// Build the refinement pipeline from settings.
pub(crate) fn refinement_pipeline(
    settings: &Settings,
    max_concurrent: Option<usize>,
) -> Result<TranscriptRefinementPipeline> {
    let llm = Arc::new(OpenAiLanguageModel::from_settings(&settings.llm)?);
    let mut pipeline =
        TranscriptRefinementPipeline::from_settings(llm, load_prompts(settings)?, &settings.refinement);
    if let Some(n) = max_concurrent {
        pipeline = pipeline.with_max_concurrent(n);
    }
    Ok(pipeline)
}

/// Run the pipeline with a spinner, optionally falling back to the input on failure.
///
/// Ctrl-C cancels the run; a second Ctrl-C exits.
pub(crate) async fn refine_transcript(
    pipeline: &TranscriptRefinementPipeline,
    transcript: Transcript,
    keep_original_on_error: bool,
) -> Result<Transcript> {
    let spinner = Output::spinner(&format!("Refining captions ({} units)...", transcript.len()));
    let fallback = keep_original_on_error.then(|| transcript.clone());

    let guard = InterruptGuard::cancel_on_interrupt(pipeline.cancel_flag());
    let result = pipeline.refine(transcript).await;
    drop(guard);

    match result {
        Ok(refined) => {
            spinner.finish_and_clear();
            Output::success("Captions refined.");
            Ok(refined)
        }
        Err(e) => {
            spinner.finish_and_clear();
            match fallback {
                Some(original) => {
                    Output::warning(&format!("Refinement failed ({}); keeping original captions.", e));
                    Ok(original)
                }
                None => {
                    Output::error(&format!("Refinement failed: {}", e));
                    Err(e.into())
                }
            }
        }
    }
}

/// Parse the requested format and decide whether segments are needed.
pub(crate) fn output_mode(args: &RefineArgs) -> Result<(OutputFormat, bool)> {
    let format: OutputFormat = args.format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let segmented = args.segments || matches!(format, OutputFormat::Srt | OutputFormat::Vtt);
    Ok((format, segmented))
}

/// Write to a file, or stdout when no path (or "-") is given.
pub(crate) fn write_output(content: &str, output: Option<&str>) -> Result<()> {
    match output {
        Some(path) if path != "-" => {
            std::fs::write(path, content)?;
            Output::success(&format!("Wrote {}", path));
        }
        _ => {
            println!("{}", content);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(format: &str, segments: bool) -> RefineArgs {
        RefineArgs {
            segments,
            format: format.to_string(),
            output: None,
            max_concurrent: None,
            keep_original_on_error: false,
        }
    }

    #[test]
    fn test_timed_formats_imply_segments() {
        assert_eq!(output_mode(&args("srt", false)).unwrap(), (OutputFormat::Srt, true));
        assert_eq!(output_mode(&args("text", false)).unwrap(), (OutputFormat::Text, false));
        assert_eq!(output_mode(&args("json", true)).unwrap(), (OutputFormat::Json, true));
        assert!(output_mode(&args("docx", false)).is_err());
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_output("hello", path.to_str()).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello");
    }
}
