//! Caption command implementation.

use super::{caption_service, output_mode, refine_transcript, refinement_pipeline, write_output};
use crate::cli::preflight::{self, Operation};
use crate::cli::{Output, RefineArgs};
use crate::config::Settings;
use crate::transcript::{format_transcript_with, transcript_from_caption};
use crate::youtube::{extract_video_id, CaptionOutcome};
use anyhow::Result;

/// Run the caption command.
pub async fn run_caption(
    url: &str,
    languages: &[String],
    refine: bool,
    args: &RefineArgs,
    settings: Settings,
) -> Result<()> {
    let (format, segmented) = output_mode(args)?;

    let operation = if refine {
        Operation::CaptionAndRefine
    } else {
        Operation::Caption
    };
    if let Err(e) = preflight::check(operation, &settings.youtube) {
        Output::error(&format!("{}", e));
        Output::info("Run 'jamak doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let service = caption_service(&settings, languages)?;

    let spinner = Output::spinner("Fetching captions...");
    let outcome = service.get_caption(url).await;
    spinner.finish_and_clear();

    let (language, content) = match outcome {
        CaptionOutcome::Found {
            language, content, ..
        } => (language, content),
        CaptionOutcome::NotFound(reason) => {
            // A video without eligible captions is an answer, not a failure.
            Output::info(&format!("No captions available: {}", reason));
            return Ok(());
        }
        other => {
            let message = other.message();
            Output::error(&message);
            anyhow::bail!(message);
        }
    };

    Output::info(&format!("Using {} captions", language));

    let mut transcript = transcript_from_caption(&content, segmented)?;
    if refine {
        let pipeline = refinement_pipeline(&settings, args.max_concurrent)?;
        transcript = refine_transcript(&pipeline, transcript, args.keep_original_on_error).await?;
    }

    let video_id = extract_video_id(url).ok().map(|id| id.to_string());
    let rendered = format_transcript_with(&transcript, format, video_id.as_deref(), Some(&language))?;
    write_output(&rendered, args.output.as_deref())
}
