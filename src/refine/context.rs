//! Context-aware second pass over ordered segments.

use super::{CallPolicy, CancelFlag, CorrectionError, LanguageModel, NeighborContext, Pass, RefineError};
use crate::config::{prompt_vars, PromptTemplate, Prompts};
use crate::transcript::TranscriptSegment;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// The three texts the context prompt sees for one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextWindow<'a> {
    /// Neighbor before, or "" for the first segment.
    pub previous: &'a str,
    /// The segment's pass-1 corrected text.
    pub current: &'a str,
    /// Neighbor after, or "" for the last segment.
    pub next: &'a str,
}

/// Build the context window of every segment.
///
/// `current` is always the corrected text. Neighbors come from `originals`
/// or `corrected` according to `neighbors`; never from pass-2 output, so
/// every window can be refined independently.
pub fn context_windows<'a>(
    originals: &'a [TranscriptSegment],
    corrected: &'a [String],
    neighbors: NeighborContext,
) -> Vec<ContextWindow<'a>> {
    let neighbor = |i: usize| -> &'a str {
        match neighbors {
            NeighborContext::Original => originals[i].text.as_str(),
            NeighborContext::Corrected => corrected[i].as_str(),
        }
    };

    let len = corrected.len().min(originals.len());
    (0..len)
        .map(|i| ContextWindow {
            previous: if i > 0 { neighbor(i - 1) } else { "" },
            current: corrected[i].as_str(),
            next: if i + 1 < len { neighbor(i + 1) } else { "" },
        })
        .collect()
}

/// Rewrites each corrected segment using its neighbors as context.
pub struct ContextualRefiner {
    llm: Arc<dyn LanguageModel>,
    prompts: Arc<Prompts>,
    policy: CallPolicy,
    neighbors: NeighborContext,
    max_concurrent: usize,
}

impl ContextualRefiner {
    pub fn new(llm: Arc<dyn LanguageModel>, prompts: Arc<Prompts>) -> Self {
        Self {
            llm,
            prompts,
            policy: CallPolicy::default(),
            neighbors: NeighborContext::Original,
            max_concurrent: 1,
        }
    }

    pub fn with_neighbor_context(mut self, neighbors: NeighborContext) -> Self {
        self.neighbors = neighbors;
        self
    }

    /// Bound on in-flight LLM calls. Zero is treated as one.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.policy.timeout = timeout;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.policy.cancel = cancel;
        self
    }

    pub fn neighbor_context(&self) -> NeighborContext {
        self.neighbors
    }

    /// Render the context prompt for one window.
    pub fn prompt_for(&self, window: &ContextWindow<'_>) -> crate::error::Result<String> {
        self.prompts.render_prompt(
            PromptTemplate::Context,
            &prompt_vars([
                ("previous", window.previous),
                ("current", window.current),
                ("next", window.next),
            ]),
        )
    }

    /// Produce the replacement text for `window.current`.
    ///
    /// Blank current text is returned unchanged without an LLM call.
    pub async fn refine_window(
        &self,
        window: &ContextWindow<'_>,
    ) -> Result<String, CorrectionError> {
        if window.current.trim().is_empty() {
            return Ok(window.current.to_string());
        }

        let prompt = self.prompt_for(window).map_err(|e| CorrectionError::Failed {
            original: window.current.to_string(),
            message: e.to_string(),
        })?;

        self.policy
            .complete(self.llm.as_ref(), &prompt, window.current)
            .await
    }

    /// Run the context pass.
    ///
    /// `corrected[i]` is the pass-1 text of `segments[i]`. Returns one segment
    /// per input, in input order, with timing and metadata copied over and
    /// only `text` replaced. Any failure discards the whole pass.
    #[instrument(skip_all, fields(segments = segments.len()))]
    pub async fn refine_with_context(
        &self,
        segments: &[TranscriptSegment],
        corrected: &[String],
    ) -> Result<Vec<TranscriptSegment>, RefineError> {
        if segments.len() != corrected.len() {
            return Err(RefineError::LengthMismatch {
                segments: segments.len(),
                corrected: corrected.len(),
            });
        }

        let windows = context_windows(segments, corrected, self.neighbors);
        info!(
            "Refining {} segments with {:?} neighbor context",
            windows.len(),
            self.neighbors
        );

        let refined: Vec<String> = stream::iter(windows.iter().enumerate())
            .map(|(index, window)| async move {
                let text = self
                    .refine_window(window)
                    .await
                    .map_err(|e| RefineError::segment(index, Pass::Context, e))?;
                debug!("Segment {} refined", index);
                Ok::<_, RefineError>(text)
            })
            .buffered(self.max_concurrent)
            .try_collect()
            .await?;

        Ok(segments
            .iter()
            .zip(refined)
            .map(|(segment, text)| segment.with_text(text))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refine::testing::FakeLlm;

    fn segments(texts: &[&str]) -> Vec<TranscriptSegment> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                TranscriptSegment::new(i as f64, Some(i as f64 + 1.0), *text).with_extra("index", i + 1)
            })
            .collect()
    }

    fn strings(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    /// Echo the window back as "previous|current|next".
    fn window_echo(prompt: &str) -> crate::error::Result<String> {
        let field = |label: &str| {
            prompt
                .lines()
                .find_map(|l| l.strip_prefix(label))
                .unwrap_or("?")
                .to_string()
        };
        Ok(format!(
            "{}|{}|{}",
            field("Previous sentence: "),
            field("Current sentence: "),
            field("Next sentence: ")
        ))
    }

    #[test]
    fn test_windows_use_original_neighbors() {
        let originals = segments(&["A", "B", "C"]);
        let corrected = strings(&["A'", "B'", "C'"]);

        let windows = context_windows(&originals, &corrected, NeighborContext::Original);
        let triples: Vec<(&str, &str, &str)> = windows
            .iter()
            .map(|w| (w.previous, w.current, w.next))
            .collect();

        assert_eq!(
            triples,
            vec![("", "A'", "B"), ("A", "B'", "C"), ("B", "C'", "")]
        );
    }

    #[test]
    fn test_windows_use_corrected_neighbors() {
        let originals = segments(&["A", "B", "C"]);
        let corrected = strings(&["A'", "B'", "C'"]);

        let windows = context_windows(&originals, &corrected, NeighborContext::Corrected);
        assert_eq!(windows[1].previous, "A'");
        assert_eq!(windows[1].next, "C'");
        assert_eq!(windows[0].previous, "");
        assert_eq!(windows[2].next, "");
    }

    #[test]
    fn test_single_segment_window_has_empty_neighbors() {
        let originals = segments(&["only"]);
        let corrected = strings(&["Only."]);
        let windows = context_windows(&originals, &corrected, NeighborContext::Original);
        assert_eq!(
            windows,
            vec![ContextWindow {
                previous: "",
                current: "Only.",
                next: ""
            }]
        );
    }

    #[tokio::test]
    async fn test_refine_with_context_preserves_timing_and_order() {
        let llm = Arc::new(FakeLlm::new(window_echo));
        let refiner = ContextualRefiner::new(llm.clone(), Arc::new(Prompts::default()))
            .with_max_concurrent(3);

        let input = segments(&["A", "B", "C"]);
        let output = refiner
            .refine_with_context(&input, &strings(&["A'", "B'", "C'"]))
            .await
            .unwrap();

        assert_eq!(output.len(), input.len());
        for (before, after) in input.iter().zip(&output) {
            assert_eq!(before.start_seconds, after.start_seconds);
            assert_eq!(before.end_seconds, after.end_seconds);
            assert_eq!(before.extra, after.extra);
        }

        let texts: Vec<&str> = output.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["|A'|B", "A|B'|C", "B|C'|"]);
        assert_eq!(llm.calls(), 3);
    }

    #[tokio::test]
    async fn test_failure_discards_output() {
        let llm = Arc::new(FakeLlm::new(|prompt| {
            if prompt.contains("Current sentence: B'") {
                Err(crate::error::JamakError::OpenAI("server error".to_string()))
            } else {
                Ok("ok".to_string())
            }
        }));
        let refiner = ContextualRefiner::new(llm, Arc::new(Prompts::default()));

        let err = refiner
            .refine_with_context(&segments(&["A", "B", "C"]), &strings(&["A'", "B'", "C'"]))
            .await
            .unwrap_err();

        match err {
            RefineError::Segment { index, pass, source } => {
                assert_eq!(index, 1);
                assert_eq!(pass, Pass::Context);
                assert_eq!(source.original_text(), "B'");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_length_mismatch() {
        let llm = Arc::new(FakeLlm::new(|_| Ok("x".to_string())));
        let refiner = ContextualRefiner::new(llm.clone(), Arc::new(Prompts::default()));

        let err = refiner
            .refine_with_context(&segments(&["A", "B"]), &strings(&["A'"]))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RefineError::LengthMismatch {
                segments: 2,
                corrected: 1
            }
        );
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let llm = Arc::new(FakeLlm::new(|_| Ok("x".to_string())));
        let refiner = ContextualRefiner::new(llm.clone(), Arc::new(Prompts::default()));
        let output = refiner.refine_with_context(&[], &[]).await.unwrap();
        assert!(output.is_empty());
        assert_eq!(llm.calls(), 0);
    }
}
