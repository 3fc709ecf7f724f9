//! Token counting with a per-model tokenizer cache

use super::tokenizer::{TiktokenLoader, Tokenizer, TokenizerLoader};
use crate::error::Result;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Token ids of a piece of text and their count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub tokens: Vec<usize>,
    pub count: usize,
}

impl TokenInfo {
    pub fn new(tokens: Vec<usize>) -> Self {
        let count = tokens.len();
        Self { tokens, count }
    }
}

/// Tokenizes text for a model, building each model's tokenizer once.
///
/// The cache lives as long as the counter; share the counter through an
/// `Arc` to reuse tokenizers across components of a run.
pub struct TokenCounter {
    loader: Arc<dyn TokenizerLoader>,
    cache: DashMap<String, Arc<dyn Tokenizer>>,
}

impl TokenCounter {
    /// Create a counter backed by a custom tokenizer loader
    pub fn new(loader: Arc<dyn TokenizerLoader>) -> Self {
        Self {
            loader,
            cache: DashMap::new(),
        }
    }

    /// Create a counter backed by tiktoken encodings
    pub fn tiktoken() -> Self {
        Self::new(Arc::new(TiktokenLoader::new()))
    }

    /// Tokenize `text` with the tokenizer for `model`
    pub fn tokenize(&self, text: &str, model: &str) -> Result<TokenInfo> {
        let tokenizer = self.tokenizer_for(model)?;
        Ok(TokenInfo::new(tokenizer.encode(text)))
    }

    /// Number of tokens `text` occupies for `model`
    pub fn count(&self, text: &str, model: &str) -> Result<usize> {
        Ok(self.tokenize(text, model)?.count)
    }

    /// Number of models whose tokenizer has been built
    pub fn cached_models(&self) -> usize {
        self.cache.len()
    }

    fn tokenizer_for(&self, model: &str) -> Result<Arc<dyn Tokenizer>> {
        if let Some(tokenizer) = self.cache.get(model) {
            return Ok(Arc::clone(tokenizer.value()));
        }

        debug!("Initializing tokenizer for model {}", model);
        let tokenizer = self.loader.load(model)?;
        let entry = self
            .cache
            .entry(model.to_string())
            .or_insert(tokenizer);
        Ok(Arc::clone(entry.value()))
    }
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::tiktoken()
    }
}
