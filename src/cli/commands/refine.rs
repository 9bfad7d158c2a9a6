//! Refine command implementation.

use super::{output_mode, refine_transcript, refinement_pipeline, write_output};
use crate::cli::preflight::{self, Operation};
use crate::cli::{Output, RefineArgs};
use crate::config::Settings;
use crate::transcript::{format_transcript, transcript_from_caption};
use anyhow::{Context, Result};

/// Run the refine command on a local caption file.
pub async fn run_refine(input: &str, args: &RefineArgs, settings: Settings) -> Result<()> {
    let (format, segmented) = output_mode(args)?;

    if let Err(e) = preflight::check(Operation::Refine, &settings.youtube) {
        Output::error(&format!("{}", e));
        Output::info("Run 'jamak doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let path = Settings::expand_path(input);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read caption file {}", path.display()))?;

    let transcript = transcript_from_caption(&content, segmented)?;
    if transcript.is_empty() {
        Output::warning("Caption file contains no text.");
        return Ok(());
    }

    let pipeline = refinement_pipeline(&settings, args.max_concurrent)?;
    let refined = refine_transcript(&pipeline, transcript, args.keep_original_on_error).await?;

    write_output(&format_transcript(&refined, format)?, args.output.as_deref())
}
