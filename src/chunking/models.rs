//! Data models for chunk planning

use crate::tokens::TokenInfo;
use serde::{Deserialize, Serialize};

/// Text standing in for a line too large for the model's context window
pub const PLACEHOLDER_CONTENT: &str = "...";

/// Token count recorded for a placeholder chunk
pub const PLACEHOLDER_TOKENS: usize = 3;

/// One input line paired with its token measurement
#[derive(Debug, Clone)]
pub struct LineRecord<'a> {
    pub content: &'a str,
    pub tokens: TokenInfo,
}

impl<'a> LineRecord<'a> {
    pub fn count(&self) -> usize {
        self.tokens.count
    }
}

/// A contiguous run of lines sent to the model as one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Lines rejoined with the original delimiter
    pub content: String,
    /// Sum of the lines' token counts, or `PLACEHOLDER_TOKENS`
    pub token_count: usize,
    /// Number of source lines covered
    pub line_count: usize,
    /// True when this chunk replaces an oversized line
    pub elided: bool,
}

impl Chunk {
    pub fn placeholder() -> Self {
        Self {
            content: PLACEHOLDER_CONTENT.to_string(),
            token_count: PLACEHOLDER_TOKENS,
            line_count: 1,
            elided: true,
        }
    }
}

/// Ordered chunks plus split statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkPlan {
    pub chunks: Vec<Chunk>,
    pub line_count: usize,
    pub total_tokens: usize,
    pub elided_lines: usize,
}

impl ChunkPlan {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn into_chunks(self) -> Vec<Chunk> {
        self.chunks
    }
}
