//! Caption refinement with an LLM.
//!
//! Refinement runs in two passes over a segmented transcript:
//!
//! 1. **Correction**: every segment's text is corrected on its own
//!    ([`TextCorrector`]).
//! 2. **Context**: every corrected segment is rewritten once more with its
//!    neighbors as context ([`ContextualRefiner`]).
//!
//! A full-text transcript only gets pass 1. Neither pass may summarize or drop
//! content; the prompts say so, but that is an instruction to the model and is
//! not verified here.

mod context;
mod corrector;
mod llm;
mod pipeline;

pub use context::{context_windows, ContextWindow, ContextualRefiner};
pub use corrector::TextCorrector;
pub use llm::OpenAiLanguageModel;
pub use pipeline::TranscriptRefinementPipeline;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// A text-completion backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a fully rendered prompt.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Which text a segment's neighbors contribute in the context pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NeighborContext {
    /// Neighbors' original caption text.
    #[default]
    Original,
    /// Neighbors' pass-1 corrected text.
    Corrected,
}

/// Refinement pass a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Correction,
    Context,
}

impl std::fmt::Display for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pass::Correction => write!(f, "correction"),
            Pass::Context => write!(f, "context"),
        }
    }
}

/// A single LLM correction call failed. Carries the text it was given.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CorrectionError {
    #[error("LLM call failed: {message}")]
    Failed { original: String, message: String },

    #[error("LLM call timed out after {}s", .after.as_secs())]
    TimedOut { original: String, after: Duration },

    #[error("LLM returned an empty response")]
    EmptyResponse { original: String },

    #[error("refinement was cancelled")]
    Cancelled { original: String },
}

impl CorrectionError {
    /// The uncorrected input of the failed call.
    pub fn original_text(&self) -> &str {
        match self {
            CorrectionError::Failed { original, .. }
            | CorrectionError::TimedOut { original, .. }
            | CorrectionError::EmptyResponse { original }
            | CorrectionError::Cancelled { original } => original,
        }
    }
}

/// Refinement of a whole transcript failed. No partial output survives.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RefineError {
    #[error("{pass} pass failed on segment {index}: {source}")]
    Segment {
        index: usize,
        pass: Pass,
        #[source]
        source: CorrectionError,
    },

    #[error("full-text correction failed: {0}")]
    Text(#[source] CorrectionError),

    #[error("refinement was cancelled")]
    Cancelled,

    #[error("{corrected} corrected texts for {segments} segments")]
    LengthMismatch { segments: usize, corrected: usize },
}

impl RefineError {
    fn segment(index: usize, pass: Pass, source: CorrectionError) -> Self {
        match source {
            CorrectionError::Cancelled { .. } => RefineError::Cancelled,
            source => RefineError::Segment {
                index,
                pass,
                source,
            },
        }
    }

    fn text(source: CorrectionError) -> Self {
        match source {
            CorrectionError::Cancelled { .. } => RefineError::Cancelled,
            source => RefineError::Text(source),
        }
    }
}

/// Shared cancellation switch for a refinement run.
///
/// Once set, no further LLM calls are issued.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Timeout and cancellation applied to every LLM call.
#[derive(Debug, Clone, Default)]
pub struct CallPolicy {
    pub timeout: Option<Duration>,
    pub cancel: CancelFlag,
}

impl CallPolicy {
    /// Issue one completion, mapping every failure to a [`CorrectionError`].
    async fn complete(
        &self,
        llm: &dyn LanguageModel,
        prompt: &str,
        original: &str,
    ) -> std::result::Result<String, CorrectionError> {
        if self.cancel.is_cancelled() {
            return Err(CorrectionError::Cancelled {
                original: original.to_string(),
            });
        }

        let call = llm.complete(prompt);
        let result = match self.timeout {
            Some(after) => tokio::time::timeout(after, call).await.map_err(|_| {
                CorrectionError::TimedOut {
                    original: original.to_string(),
                    after,
                }
            })?,
            None => call.await,
        };

        let text = result.map_err(|e| CorrectionError::Failed {
            original: original.to_string(),
            message: e.to_string(),
        })?;

        let text = text.trim();
        if text.is_empty() {
            return Err(CorrectionError::EmptyResponse {
                original: original.to_string(),
            });
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted language model for refinement tests.

    use super::LanguageModel;
    use crate::error::{JamakError, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records every prompt and answers with a transformation of it.
    pub struct FakeLlm {
        pub prompts: Mutex<Vec<String>>,
        respond: Box<dyn Fn(&str) -> Result<String> + Send + Sync>,
        delay: Option<Duration>,
    }

    impl FakeLlm {
        pub fn new(respond: impl Fn(&str) -> Result<String> + Send + Sync + 'static) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                respond: Box::new(respond),
                delay: None,
            }
        }

        pub fn failing(message: &str) -> Self {
            let message = message.to_string();
            Self::new(move |_| Err(JamakError::OpenAI(message.clone())))
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        pub fn recorded(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LanguageModel for FakeLlm {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            (self.respond)(prompt)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeLlm;
    use super::*;

    #[tokio::test]
    async fn test_call_policy_trims_output() {
        let llm = FakeLlm::new(|_| Ok("  fixed \n".to_string()));
        let out = CallPolicy::default().complete(&llm, "p", "orig").await;
        assert_eq!(out, Ok("fixed".to_string()));
    }

    #[tokio::test]
    async fn test_call_policy_empty_response() {
        let llm = FakeLlm::new(|_| Ok("   ".to_string()));
        let err = CallPolicy::default()
            .complete(&llm, "p", "orig")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CorrectionError::EmptyResponse {
                original: "orig".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_call_policy_timeout() {
        let llm = FakeLlm::new(|_| Ok("late".to_string())).with_delay(Duration::from_secs(5));
        let policy = CallPolicy {
            timeout: Some(Duration::from_millis(10)),
            ..Default::default()
        };

        let err = policy.complete(&llm, "p", "orig").await.unwrap_err();
        assert!(matches!(err, CorrectionError::TimedOut { .. }));
        assert_eq!(err.original_text(), "orig");
    }

    #[tokio::test]
    async fn test_call_policy_cancelled_skips_call() {
        let llm = FakeLlm::new(|_| Ok("x".to_string()));
        let policy = CallPolicy::default();
        policy.cancel.cancel();

        let err = policy.complete(&llm, "p", "orig").await.unwrap_err();
        assert!(matches!(err, CorrectionError::Cancelled { .. }));
        assert_eq!(llm.calls(), 0);
    }

    #[test]
    fn test_refine_error_maps_cancellation() {
        let cancelled = CorrectionError::Cancelled {
            original: "a".to_string(),
        };
        assert_eq!(
            RefineError::segment(3, Pass::Context, cancelled),
            RefineError::Cancelled
        );

        let failed = CorrectionError::Failed {
            original: "a".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(
            RefineError::segment(3, Pass::Correction, failed).to_string(),
            "correction pass failed on segment 3: LLM call failed: boom"
        );
    }
}
