//! Configuration module for Jamak.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{prompt_vars, PromptTemplate, Prompts, RecipePrompts, RefinePrompts};
pub use settings::{
    GeneralSettings, LlmSettings, PromptSettings, RefinementSettings, Settings, YoutubeSettings,
    YOUTUBE_ACCESS_TOKEN_ENV, YOUTUBE_API_KEY_ENV,
};
