//! Summarize arbitrarily long text with token-bounded, context-chained LLM calls.
//!
//! Content is split on a delimiter into lines, the lines are packed into
//! chunks that fit a token budget and the model's context window, and each
//! chunk is summarized in order with the previous chunk's summary as context.

pub mod chunking;
pub mod completion;
pub mod config;
pub mod error;
pub mod input;
pub mod pipeline;
pub mod summarizer;
pub mod tokens;

pub use chunking::{Chunk, ChunkPlan, Chunker};
pub use completion::{Completion, CompletionConfig, OpenAiCompletionClient};
pub use config::{CliOverrides, Config, ModelEntry};
pub use error::{Result, SummaryError};
pub use input::{ensure_single_stdin, TextSource};
pub use pipeline::{PipelineSettings, SummaryPipeline};
pub use summarizer::{SequentialSummarizer, SummarizerOptions};
pub use tokens::{ModelLimits, TokenCounter, TokenInfo};
