//! Describe command implementation.

use super::caption_service;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::youtube::DescriptionOutcome;
use anyhow::Result;

/// Run the describe command.
pub async fn run_describe(url: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Caption, &settings.youtube) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let service = caption_service(&settings, &[])?;

    match service.get_video_description(url).await {
        DescriptionOutcome::Found(video) => {
            Output::header(&video.title);
            if let Some(channel) = &video.channel {
                Output::kv("Channel", channel);
            }
            if let Some(published) = &video.published_at {
                Output::kv("Published", published);
            }
            Output::kv("URL", &video.watch_url());
            println!();
            println!("{}", video.description);
        }
        outcome @ DescriptionOutcome::NotFound(_) => {
            Output::info(&outcome.message());
        }
        other => {
            let message = other.message();
            Output::error(&message);
            anyhow::bail!(message);
        }
    }

    Ok(())
}
