//! Greedy line packing into token-bounded chunks
//!
//! Lines are measured individually and packed in order until the next line
//! would push the chunk past the caller's budget. A line that could not fit
//! in the model's context window even on its own is replaced by a
//! placeholder chunk and never sent.

use super::models::{Chunk, ChunkPlan, LineRecord};
use crate::error::{Result, SummaryError};
use crate::tokens::{ModelLimits, TokenCounter};
use std::sync::Arc;
use tracing::{debug, warn};

/// Tokens reserved below the model maximum when judging a single line
pub const LINE_SAFETY_MARGIN: usize = 1000;

/// Default chunk-size budget in tokens
pub const DEFAULT_CHUNK_SIZE: usize = 100_000;

/// Splits content into chunks that respect a model's context window
pub struct Chunker {
    counter: Arc<TokenCounter>,
    limits: ModelLimits,
}

impl Chunker {
    pub fn new(counter: Arc<TokenCounter>, limits: ModelLimits) -> Self {
        Self { counter, limits }
    }

    /// Plan the chunks for `content`
    pub fn plan(
        &self,
        content: &str,
        delimiter: &str,
        chunk_size: usize,
        model: &str,
    ) -> Result<ChunkPlan> {
        let max_tokens = self.limits.max_tokens(model)?;

        if delimiter.is_empty() {
            return Err(SummaryError::Configuration(
                "Delimiter must not be empty".to_string(),
            ));
        }

        if content.is_empty() {
            return Ok(ChunkPlan::default());
        }

        let lines = content
            .split(delimiter)
            .map(|line| {
                self.counter
                    .tokenize(line, model)
                    .map(|tokens| LineRecord { content: line, tokens })
            })
            .collect::<Result<Vec<_>>>()?;

        let line_limit = max_tokens.saturating_sub(LINE_SAFETY_MARGIN);
        let mut plan = ChunkPlan {
            line_count: lines.len(),
            ..ChunkPlan::default()
        };
        let mut pending = PendingChunk::default();

        for (index, line) in lines.iter().enumerate() {
            plan.total_tokens += line.count();

            if line.count() > line_limit {
                warn!(
                    "Line {} has {} tokens, over the {} token line limit for {}; eliding it",
                    index + 1,
                    line.count(),
                    line_limit,
                    model
                );
                pending.flush_into(&mut plan.chunks, delimiter);
                plan.chunks.push(Chunk::placeholder());
                plan.elided_lines += 1;
                continue;
            }

            if !pending.is_empty() && pending.token_count + line.count() > chunk_size {
                pending.flush_into(&mut plan.chunks, delimiter);
            }
            pending.push(line);
        }
        pending.flush_into(&mut plan.chunks, delimiter);

        debug!(
            "Split {} lines ({} tokens) into {} chunks",
            plan.line_count,
            plan.total_tokens,
            plan.chunks.len()
        );

        Ok(plan)
    }
}

/// Lines accumulated for the chunk being built
#[derive(Default)]
struct PendingChunk<'a> {
    lines: Vec<&'a str>,
    token_count: usize,
}

impl<'a> PendingChunk<'a> {
    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn push(&mut self, line: &LineRecord<'a>) {
        self.lines.push(line.content);
        self.token_count += line.count();
    }

    fn flush_into(&mut self, chunks: &mut Vec<Chunk>, delimiter: &str) {
        if self.is_empty() {
            return;
        }
        let lines = std::mem::take(&mut self.lines);
        chunks.push(Chunk {
            content: lines.join(delimiter),
            token_count: std::mem::take(&mut self.token_count),
            line_count: lines.len(),
            elided: false,
        });
    }
}
