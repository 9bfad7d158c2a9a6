//! Recipe command implementation.

use super::{
    caption_service, load_prompts, refine_transcript, refinement_pipeline, write_output,
};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::recipe::RecipeAnalyzer;
use crate::refine::OpenAiLanguageModel;
use crate::transcript::transcript_from_caption;
use crate::youtube::CaptionOutcome;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Run the recipe command.
pub async fn run_recipe(
    url: Option<&str>,
    file: Option<&str>,
    refine: bool,
    output: Option<&str>,
    settings: Settings,
) -> Result<()> {
    let operation = if url.is_some() {
        Operation::CaptionAndRefine
    } else {
        Operation::Refine
    };
    if let Err(e) = preflight::check(operation, &settings.youtube) {
        Output::error(&format!("{}", e));
        Output::info("Run 'jamak doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let content = match (url, file) {
        (Some(url), _) => {
            let service = caption_service(&settings, &[])?;
            let spinner = Output::spinner("Fetching captions...");
            let outcome = service.get_caption(url).await;
            spinner.finish_and_clear();

            match outcome {
                CaptionOutcome::Found { content, .. } => content,
                CaptionOutcome::NotFound(reason) => {
                    Output::info(&format!("No captions available: {}", reason));
                    return Ok(());
                }
                other => {
                    let message = other.message();
                    Output::error(&message);
                    anyhow::bail!(message);
                }
            }
        }
        (None, Some(file)) => {
            let path = Settings::expand_path(file);
            std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read caption file {}", path.display()))?
        }
        (None, None) => anyhow::bail!("Provide a video URL or --file"),
    };

    let mut transcript = transcript_from_caption(&content, false)?;
    if refine {
        let pipeline = refinement_pipeline(&settings, None)?;
        transcript = refine_transcript(&pipeline, transcript, false).await?;
    }

    let llm = Arc::new(OpenAiLanguageModel::from_settings(&settings.llm)?);
    let analyzer = RecipeAnalyzer::new(llm, load_prompts(&settings)?);

    let spinner = Output::spinner("Extracting recipe...");
    let recipe = analyzer.analyze(&transcript.full_text()).await;
    spinner.finish_and_clear();

    write_output(&recipe?, output)
}
