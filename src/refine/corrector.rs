//! Single-segment correction.

use super::{CallPolicy, CancelFlag, CorrectionError, LanguageModel};
use crate::config::{prompt_vars, PromptTemplate, Prompts};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Fixes grammar and fluency of one piece of caption text.
///
/// Stateless apart from its collaborators; safe to share across tasks.
pub struct TextCorrector {
    llm: Arc<dyn LanguageModel>,
    prompts: Arc<Prompts>,
    policy: CallPolicy,
}

impl TextCorrector {
    pub fn new(llm: Arc<dyn LanguageModel>, prompts: Arc<Prompts>) -> Self {
        Self {
            llm,
            prompts,
            policy: CallPolicy::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.policy.timeout = timeout;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.policy.cancel = cancel;
        self
    }

    /// Render the correction prompt for `text`.
    pub fn prompt_for(&self, text: &str) -> crate::error::Result<String> {
        self.prompts
            .render_prompt(PromptTemplate::Correction, &prompt_vars([("text", text)]))
    }

    /// Correct `text`. Blank input is returned unchanged without an LLM call.
    #[instrument(skip_all, fields(chars = text.len()))]
    pub async fn correct(&self, text: &str) -> Result<String, CorrectionError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let prompt = self.prompt_for(text).map_err(|e| CorrectionError::Failed {
            original: text.to_string(),
            message: e.to_string(),
        })?;

        let corrected = self.policy.complete(self.llm.as_ref(), &prompt, text).await?;
        debug!("Corrected {} -> {} chars", text.len(), corrected.len());
        Ok(corrected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refine::testing::FakeLlm;

    fn corrector(llm: Arc<FakeLlm>) -> TextCorrector {
        TextCorrector::new(llm, Arc::new(Prompts::default()))
    }

    #[tokio::test]
    async fn test_correct_sends_rendered_prompt() {
        let llm = Arc::new(FakeLlm::new(|_| Ok("I went home.".to_string())));
        let out = corrector(llm.clone()).correct("i go home yesterday").await;

        assert_eq!(out, Ok("I went home.".to_string()));
        let prompts = llm.recorded();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Original text:\ni go home yesterday\n"));
        assert!(prompts[0].contains("Never summarize"));
    }

    #[tokio::test]
    async fn test_failure_carries_original_text() {
        let llm = Arc::new(FakeLlm::failing("rate limited"));
        let err = corrector(llm).correct("raw caption").await.unwrap_err();

        assert_eq!(err.original_text(), "raw caption");
        assert!(err.to_string().contains("rate limited"));
    }

    #[tokio::test]
    async fn test_blank_text_skips_llm() {
        let llm = Arc::new(FakeLlm::new(|_| Ok("should not be used".to_string())));
        let out = corrector(llm.clone()).correct("  ").await;
        assert_eq!(out, Ok("  ".to_string()));
        assert_eq!(llm.calls(), 0);
    }
}
