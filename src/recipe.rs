//! Recipe extraction from a refined transcript.
//!
//! The transcript is treated as an opaque string; the structure of the result
//! is whatever the recipe prompt asks the model for.

use crate::config::{prompt_vars, PromptTemplate, Prompts};
use crate::error::{JamakError, Result};
use crate::refine::LanguageModel;
use std::sync::Arc;
use tracing::{info, instrument};

pub struct RecipeAnalyzer {
    llm: Arc<dyn LanguageModel>,
    prompts: Arc<Prompts>,
}

impl RecipeAnalyzer {
    pub fn new(llm: Arc<dyn LanguageModel>, prompts: Arc<Prompts>) -> Self {
        Self { llm, prompts }
    }

    /// Organize the recipe described in `transcript`.
    #[instrument(skip_all, fields(chars = transcript.len()))]
    pub async fn analyze(&self, transcript: &str) -> Result<String> {
        if transcript.trim().is_empty() {
            return Err(JamakError::InvalidInput(
                "cannot extract a recipe from an empty transcript".to_string(),
            ));
        }

        let prompt = self
            .prompts
            .render_prompt(PromptTemplate::Recipe, &prompt_vars([("transcript", transcript)]))?;

        info!("Extracting recipe");
        let recipe = self.llm.complete(&prompt).await?;
        Ok(recipe.trim().to_string())
    }
}
