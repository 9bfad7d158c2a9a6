//! Jamak - YouTube Caption Retrieval and Refinement
//!
//! A CLI tool that fetches a video's human-authored captions and cleans them
//! up with an LLM without summarizing them or losing their timing.
//!
//! The name "Jamak" comes from the Korean word for "subtitles" (자막).
//!
//! # Overview
//!
//! Jamak allows you to:
//! - Pick the best caption track by language preference, skipping ASR tracks
//! - Correct caption text, segment by segment, with neighbor context
//! - Export refined captions as text, JSON, SRT or VTT
//! - Turn a cooking video's captions into a structured recipe
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `youtube` - Video ids, caption selection and the YouTube Data API
//! - `transcript` - Transcript models, SRT/WebVTT/SBV parsing, output formats
//! - `refine` - LLM correction and the two-pass refinement pipeline
//! - `recipe` - Recipe extraction from refined captions
//!
//! # Example
//!
//! ```rust,no_run
//! use jamak::config::{Prompts, Settings};
//! use jamak::refine::{OpenAiLanguageModel, TranscriptRefinementPipeline};
//! use jamak::transcript::{transcript_from_caption, Transcript};
//! use jamak::youtube::{CaptionOutcome, CaptionService, YoutubeDataApi};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let api = Arc::new(YoutubeDataApi::from_settings(&settings.youtube)?);
//!     let captions = CaptionService::from_client(api);
//!
//!     if let CaptionOutcome::Found { content, .. } =
//!         captions.get_caption("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await
//!     {
//!         let llm = Arc::new(OpenAiLanguageModel::from_settings(&settings.llm)?);
//!         let pipeline = TranscriptRefinementPipeline::new(llm, Arc::new(Prompts::default()));
//!         let refined: Transcript = pipeline.refine(transcript_from_caption(&content, true)?).await?;
//!         println!("{}", refined.full_text());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod recipe;
pub mod refine;
pub mod transcript;
pub mod youtube;

pub use error::{JamakError, Result};
