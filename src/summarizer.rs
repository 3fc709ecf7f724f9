//! Context-chained summarization of planned chunks
//!
//! Chunks are summarized strictly in order. The summary of chunk `i` is
//! embedded in the prompt for chunk `i + 1`; only the latest summary is
//! carried forward, so prompt size stays bounded however many chunks exist.

use crate::chunking::Chunk;
use crate::completion::Completion;
use crate::error::{Result, SummaryError};
use futures::{stream, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info};

/// Separator placed between chunk summaries in the final output
pub const SUMMARY_SEPARATOR: &str = "\n\n";

/// Prompt for a chunk, continuing from `previous` when there is one
pub fn build_prompt(previous: &str, content: &str) -> String {
    if previous.is_empty() {
        format!("Summarize the following text:\n\n{}", content)
    } else {
        format!(
            "Continue summarizing the following text, taking into account this summary \
            of the preceding text:\n\n{}\n\nText to summarize:\n\n{}",
            previous, content
        )
    }
}

/// How chunks are driven through the completion service
#[derive(Debug, Clone)]
pub struct SummarizerOptions {
    /// Thread each summary into the next chunk's prompt
    pub chain_context: bool,
    /// Concurrent calls allowed when `chain_context` is off
    pub max_concurrency: usize,
}

impl Default for SummarizerOptions {
    fn default() -> Self {
        Self {
            chain_context: true,
            max_concurrency: 1,
        }
    }
}

/// State carried between chunks
#[derive(Debug, Default)]
struct RunningSummary {
    previous: String,
    summaries: Vec<String>,
}

/// Summarizes chunks one completion call at a time
pub struct SequentialSummarizer {
    completion: Arc<dyn Completion>,
    options: SummarizerOptions,
}

impl SequentialSummarizer {
    pub fn new(completion: Arc<dyn Completion>) -> Self {
        Self::with_options(completion, SummarizerOptions::default())
    }

    pub fn with_options(completion: Arc<dyn Completion>, options: SummarizerOptions) -> Self {
        Self {
            completion,
            options,
        }
    }

    /// Summarize all chunks and join the summaries with blank lines.
    ///
    /// The first failing call aborts the run; earlier summaries are dropped.
    pub async fn summarize(&self, chunks: &[Chunk]) -> Result<String> {
        Ok(self.summaries(chunks).await?.join(SUMMARY_SEPARATOR))
    }

    /// Per-chunk summaries in chunk order
    pub async fn summaries(&self, chunks: &[Chunk]) -> Result<Vec<String>> {
        if self.options.chain_context {
            self.summarize_chained(chunks).await
        } else {
            self.summarize_independent(chunks).await
        }
    }

    async fn summarize_chained(&self, chunks: &[Chunk]) -> Result<Vec<String>> {
        let total = chunks.len();

        let state = stream::iter(chunks.iter().enumerate().map(Ok::<_, SummaryError>))
            .try_fold(RunningSummary::default(), |mut state, (index, chunk)| async move {
                let prompt = build_prompt(&state.previous, &chunk.content);
                let summary = self.summarize_chunk(index, total, chunk, &prompt).await?;
                state.summaries.push(summary.clone());
                state.previous = summary;
                Ok::<_, SummaryError>(state)
            })
            .await?;

        Ok(state.summaries)
    }

    async fn summarize_independent(&self, chunks: &[Chunk]) -> Result<Vec<String>> {
        let total = chunks.len();
        let concurrency = self.options.max_concurrency.max(1);
        debug!("Summarizing {} chunks independently, {} at a time", total, concurrency);

        stream::iter(chunks.iter().enumerate())
            .map(|(index, chunk)| async move {
                let prompt = build_prompt("", &chunk.content);
                self.summarize_chunk(index, total, chunk, &prompt).await
            })
            .buffered(concurrency)
            .try_collect()
            .await
    }

    async fn summarize_chunk(
        &self,
        index: usize,
        total: usize,
        chunk: &Chunk,
        prompt: &str,
    ) -> Result<String> {
        info!(
            "Summarizing chunk {}/{} ({} tokens)",
            index + 1,
            total,
            chunk.token_count
        );
        let summary = self.completion.complete(prompt).await?;
        info!("Summary {}/{}: {}", index + 1, total, summary);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records prompts and answers "summary N", failing on a chosen call
    struct ScriptedCompletion {
        prompts: Mutex<Vec<String>>,
        fail_on: Option<usize>,
    }

    impl ScriptedCompletion {
        fn new(fail_on: Option<usize>) -> Arc<Self> {
            Arc::new(Self {
                prompts: Mutex::new(Vec::new()),
                fail_on,
            })
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Completion for ScriptedCompletion {
        async fn complete(&self, prompt: &str) -> Result<String> {
            let call = {
                let mut prompts = self.prompts.lock().unwrap();
                prompts.push(prompt.to_string());
                prompts.len()
            };
            if self.fail_on == Some(call) {
                return Err(SummaryError::UpstreamError("Status 500: boom".to_string()));
            }
            Ok(format!("summary {}", call))
        }
    }

    fn chunk(content: &str) -> Chunk {
        Chunk {
            content: content.to_string(),
            token_count: content.split_whitespace().count(),
            line_count: 1,
            elided: false,
        }
    }

    #[test]
    fn test_build_prompt() {
        let first = build_prompt("", "body");
        assert!(first.starts_with("Summarize the following text"));
        assert!(first.ends_with("body"));

        let next = build_prompt("earlier summary", "body");
        assert!(next.starts_with("Continue summarizing"));
        assert!(next.contains("earlier summary"));
        assert!(next.ends_with("body"));
    }

    #[tokio::test]
    async fn test_chained_prompts_carry_previous_summary() {
        let completion = ScriptedCompletion::new(None);
        let summarizer = SequentialSummarizer::new(completion.clone());
        let chunks = vec![chunk("first"), chunk("second"), chunk("third")];

        let result = summarizer.summarize(&chunks).await.unwrap();
        assert_eq!(result, "summary 1\n\nsummary 2\n\nsummary 3");

        let prompts = completion.prompts();
        assert_eq!(prompts.len(), chunks.len());
        assert!(!prompts[0].contains("Continue summarizing"));
        assert!(prompts[1].contains("summary 1"));
        assert!(prompts[2].contains("summary 2"));
        assert!(!prompts[2].contains("summary 1"));
    }

    #[tokio::test]
    async fn test_failure_aborts_run() {
        let completion = ScriptedCompletion::new(Some(2));
        let summarizer = SequentialSummarizer::new(completion.clone());
        let chunks = vec![chunk("first"), chunk("second"), chunk("third")];

        let result = summarizer.summarize(&chunks).await;
        assert!(matches!(result, Err(SummaryError::UpstreamError(_))));
        assert_eq!(completion.prompts().len(), 2);
    }

    #[tokio::test]
    async fn test_no_chunks_no_calls() {
        let completion = ScriptedCompletion::new(None);
        let summarizer = SequentialSummarizer::new(completion.clone());
        assert_eq!(summarizer.summarize(&[]).await.unwrap(), "");
        assert!(completion.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_independent_mode_uses_plain_prompts() {
        let completion = ScriptedCompletion::new(None);
        let summarizer = SequentialSummarizer::with_options(
            completion.clone(),
            SummarizerOptions {
                chain_context: false,
                max_concurrency: 4,
            },
        );
        let chunks = vec![chunk("first"), chunk("second")];

        let summaries = summarizer.summaries(&chunks).await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert!(completion
            .prompts()
            .iter()
            .all(|p| p.starts_with("Summarize the following text")));
    }
}
