//! Two-pass transcript refinement.

use super::{
    CancelFlag, ContextualRefiner, LanguageModel, NeighborContext, Pass, RefineError,
    TextCorrector,
};
use crate::config::{Prompts, RefinementSettings};
use crate::transcript::{Transcript, TranscriptSegment};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Corrects a transcript, then refines it with neighbor context.
///
/// Full text gets a single correction call. Segments get a correction call
/// each (pass 1) followed by a context call each (pass 2). Output has the
/// same shape and length as the input; timing is never touched.
pub struct TranscriptRefinementPipeline {
    corrector: TextCorrector,
    refiner: ContextualRefiner,
    max_concurrent: usize,
    cancel: CancelFlag,
}

impl TranscriptRefinementPipeline {
    pub fn new(llm: Arc<dyn LanguageModel>, prompts: Arc<Prompts>) -> Self {
        Self {
            corrector: TextCorrector::new(llm.clone(), prompts.clone()),
            refiner: ContextualRefiner::new(llm, prompts),
            max_concurrent: 1,
            cancel: CancelFlag::new(),
        }
    }

    /// Create a pipeline configured from settings.
    pub fn from_settings(
        llm: Arc<dyn LanguageModel>,
        prompts: Arc<Prompts>,
        settings: &RefinementSettings,
    ) -> Self {
        Self::new(llm, prompts)
            .with_max_concurrent(settings.max_concurrent)
            .with_request_timeout(settings.request_timeout())
            .with_neighbor_context(settings.neighbor_context)
    }

    /// Bound on in-flight LLM calls within each pass. Zero is treated as one.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self.refiner = self.refiner.with_max_concurrent(self.max_concurrent);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.corrector = self.corrector.with_timeout(timeout);
        self.refiner = self.refiner.with_timeout(timeout);
        self
    }

    pub fn with_neighbor_context(mut self, neighbors: NeighborContext) -> Self {
        self.refiner = self.refiner.with_neighbor_context(neighbors);
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.corrector = self.corrector.with_cancel_flag(cancel.clone());
        self.refiner = self.refiner.with_cancel_flag(cancel.clone());
        self.cancel = cancel;
        self
    }

    /// Handle that stops further LLM calls when cancelled.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Refine a transcript, returning one of the same shape.
    ///
    /// All or nothing: on failure or cancellation no partially refined
    /// transcript is returned.
    #[instrument(skip_all, fields(units = input.len()))]
    pub async fn refine(&self, input: Transcript) -> Result<Transcript, RefineError> {
        let output = match input {
            Transcript::Text(text) => {
                info!("Correcting full-text transcript ({} chars)", text.len());
                let corrected = self
                    .corrector
                    .correct(&text)
                    .await
                    .map_err(RefineError::text)?;
                Transcript::Text(corrected)
            }
            Transcript::Segments(segments) => {
                info!("Refining {} segments", segments.len());
                let corrected = self.correct_segments(&segments).await?;
                let refined = self
                    .refiner
                    .refine_with_context(&segments, &corrected)
                    .await?;
                Transcript::Segments(refined)
            }
        };

        if self.cancel.is_cancelled() {
            return Err(RefineError::Cancelled);
        }
        Ok(output)
    }

    /// Pass 1: correct every segment's text independently.
    pub async fn correct_segments(
        &self,
        segments: &[TranscriptSegment],
    ) -> Result<Vec<String>, RefineError> {
        stream::iter(segments.iter().enumerate())
            .map(|(index, segment)| async move {
                let text = self
                    .corrector
                    .correct(&segment.text)
                    .await
                    .map_err(|e| RefineError::segment(index, Pass::Correction, e))?;
                debug!("Segment {} corrected", index);
                Ok::<_, RefineError>(text)
            })
            .buffered(self.max_concurrent)
            .try_collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refine::testing::FakeLlm;

    fn pipeline(llm: Arc<FakeLlm>) -> TranscriptRefinementPipeline {
        TranscriptRefinementPipeline::new(llm, Arc::new(Prompts::default()))
    }

    /// Mark correction prompts with a prime and echo context windows.
    fn scripted(prompt: &str) -> crate::error::Result<String> {
        if let Some(rest) = prompt.split("Original text:\n").nth(1) {
            let text = rest.split("\n\nCorrected text:").next().unwrap_or("");
            return Ok(format!("{}'", text));
        }
        let field = |label: &str| {
            prompt
                .lines()
                .find_map(|l| l.strip_prefix(label))
                .unwrap_or("?")
                .to_string()
        };
        Ok(format!(
            "({},{},{})",
            field("Previous sentence: "),
            field("Current sentence: "),
            field("Next sentence: ")
        ))
    }

    fn three_segments() -> Vec<TranscriptSegment> {
        vec![
            TranscriptSegment::new(0.0, Some(1.0), "A"),
            TranscriptSegment::new(1.0, Some(2.0), "B").with_extra("speaker", "host"),
            TranscriptSegment::new(2.0, None, "C"),
        ]
    }

    #[tokio::test]
    async fn test_flat_text_is_corrected_once_without_context() {
        let llm = Arc::new(FakeLlm::new(scripted));
        let output = pipeline(llm.clone())
            .refine(Transcript::Text("whole caption".to_string()))
            .await
            .unwrap();

        assert_eq!(output, Transcript::Text("whole caption'".to_string()));
        let prompts = llm.recorded();
        assert_eq!(prompts.len(), 1);
        assert!(!prompts[0].contains("Previous sentence"));
    }

    #[tokio::test]
    async fn test_segments_run_both_passes() {
        let llm = Arc::new(FakeLlm::new(scripted));
        let input = three_segments();
        let output = pipeline(llm.clone())
            .refine(Transcript::Segments(input.clone()))
            .await
            .unwrap();

        let Transcript::Segments(output) = output else {
            panic!("segment input must produce segment output");
        };

        let texts: Vec<&str> = output.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["(,A',B)", "(A,B',C)", "(B,C',)"]);

        for (before, after) in input.iter().zip(&output) {
            assert_eq!(before.start_seconds, after.start_seconds);
            assert_eq!(before.end_seconds, after.end_seconds);
            assert_eq!(before.extra, after.extra);
        }
        assert_eq!(llm.calls(), 6);
    }

    #[tokio::test]
    async fn test_corrected_neighbor_mode() {
        let llm = Arc::new(FakeLlm::new(scripted));
        let output = pipeline(llm)
            .with_neighbor_context(NeighborContext::Corrected)
            .with_max_concurrent(4)
            .refine(Transcript::Segments(three_segments()))
            .await
            .unwrap();

        assert_eq!(
            output.full_text(),
            "(,A',B')\n(A',B',C')\n(B',C',)"
        );
    }

    #[tokio::test]
    async fn test_pass_one_failure_stops_before_context_pass() {
        let llm = Arc::new(FakeLlm::new(|prompt| {
            if prompt.contains("Original text:\nB\n") {
                Err(crate::error::JamakError::OpenAI("quota".to_string()))
            } else {
                scripted(prompt)
            }
        }));

        let err = pipeline(llm.clone())
            .refine(Transcript::Segments(three_segments()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RefineError::Segment {
                index: 1,
                pass: Pass::Correction,
                ..
            }
        ));
        assert!(llm
            .recorded()
            .iter()
            .all(|p| !p.contains("Previous sentence")));
    }

    #[tokio::test]
    async fn test_flat_failure_is_typed() {
        let llm = Arc::new(FakeLlm::failing("timeout"));
        let err = pipeline(llm)
            .refine(Transcript::Text("keep me".to_string()))
            .await
            .unwrap_err();

        match err {
            RefineError::Text(source) => assert_eq!(source.original_text(), "keep me"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancellation_stops_new_calls() {
        let cancel = CancelFlag::new();
        let flag = cancel.clone();
        let llm = Arc::new(FakeLlm::new(move |prompt| {
            // Cancel as soon as the first segment is being corrected.
            flag.cancel();
            scripted(prompt)
        }));

        let err = pipeline(llm.clone())
            .with_cancel_flag(cancel)
            .refine(Transcript::Segments(three_segments()))
            .await
            .unwrap_err();

        assert_eq!(err, RefineError::Cancelled);
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_segments() {
        let llm = Arc::new(FakeLlm::new(scripted));
        let output = pipeline(llm.clone())
            .refine(Transcript::Segments(Vec::new()))
            .await
            .unwrap();
        assert_eq!(output, Transcript::Segments(Vec::new()));
        assert_eq!(llm.calls(), 0);
    }
}
