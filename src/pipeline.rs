//! End-to-end summarization: plan chunks, then summarize them in order

use crate::chunking::{ChunkPlan, Chunker};
use crate::completion::{Completion, OpenAiCompletionClient};
use crate::config::Config;
use crate::error::Result;
use crate::summarizer::SequentialSummarizer;
use crate::tokens::TokenCounter;
use std::sync::Arc;
use tracing::info;

/// Settings for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub model: String,
    pub delimiter: String,
    pub chunk_size: usize,
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            model: config.model.clone(),
            delimiter: config.delimiter.clone(),
            chunk_size: config.chunk_size,
        }
    }
}

/// Chunker and summarizer sharing one run's tokenizer cache
pub struct SummaryPipeline {
    chunker: Chunker,
    summarizer: SequentialSummarizer,
    settings: PipelineSettings,
}

impl SummaryPipeline {
    pub fn new(
        chunker: Chunker,
        summarizer: SequentialSummarizer,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            chunker,
            summarizer,
            settings,
        }
    }

    /// Build the HTTP-backed pipeline described by `config`
    pub fn from_config(config: &Config, counter: Arc<TokenCounter>) -> Result<Self> {
        let limits = config.model_limits();
        // Unknown models fail here, before any tokenizer is built.
        limits.max_tokens(&config.model)?;

        let client = OpenAiCompletionClient::new(
            config.completion_config(),
            Arc::clone(&counter),
            limits.clone(),
        )?;
        let completion: Arc<dyn Completion> = Arc::new(client);

        Ok(Self::new(
            Chunker::new(counter, limits),
            SequentialSummarizer::with_options(completion, config.summarizer_options()),
            PipelineSettings::from(config),
        ))
    }

    /// Split `content` into chunks without summarizing
    pub fn plan(&self, content: &str) -> Result<ChunkPlan> {
        self.chunker.plan(
            content,
            &self.settings.delimiter,
            self.settings.chunk_size,
            &self.settings.model,
        )
    }

    /// Summarize `content`, returning the joined chunk summaries
    pub async fn run(&self, content: &str) -> Result<String> {
        let plan = self.plan(content)?;
        info!(
            "Split {} lines ({} tokens) into {} chunks, {} lines elided",
            plan.line_count,
            plan.total_tokens,
            plan.len(),
            plan.elided_lines
        );
        self.summarizer.summarize(&plan.chunks).await
    }
}
