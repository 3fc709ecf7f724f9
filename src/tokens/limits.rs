//! Context window registry

use crate::error::{Result, SummaryError};
use std::collections::HashMap;

/// Context windows of the built-in chat models
pub const MODEL_CONTEXT_WINDOWS: &[(&str, usize)] = &[
    ("gpt-3.5-turbo", 16385),
    ("gpt-3.5-turbo-16k", 16385),
    ("gpt-3.5-turbo-1106", 16385),
    ("gpt-3.5-turbo-0125", 16385),
    ("gpt-4", 8192),
    ("gpt-4-0613", 8192),
    ("gpt-4-32k", 32768),
    ("gpt-4-1106-preview", 128000),
    ("gpt-4-0125-preview", 128000),
    ("gpt-4-turbo", 128000),
    ("gpt-4-turbo-preview", 128000),
    ("gpt-4o", 128000),
    ("gpt-4o-mini", 128000),
];

/// Maximum context length per model.
///
/// Lookups never fall back to a guessed limit: a model missing from the
/// registry is an error. Model names compare case-insensitively.
#[derive(Debug, Clone)]
pub struct ModelLimits {
    limits: HashMap<String, usize>,
}

impl ModelLimits {
    /// Registry holding only the built-in models
    pub fn builtin() -> Self {
        let limits = MODEL_CONTEXT_WINDOWS
            .iter()
            .map(|(model, size)| (model.to_string(), *size))
            .collect();
        Self { limits }
    }

    /// Register (or override) a model's context window
    pub fn with_limit(mut self, model: impl Into<String>, max_tokens: usize) -> Self {
        self.limits.insert(model.into().to_lowercase(), max_tokens);
        self
    }

    /// Maximum context length of `model` in tokens
    pub fn max_tokens(&self, model: &str) -> Result<usize> {
        self.limits
            .get(&model.to_lowercase())
            .copied()
            .ok_or_else(|| SummaryError::UnknownModel(model.to_string()))
    }

    pub fn contains(&self, model: &str) -> bool {
        self.limits.contains_key(&model.to_lowercase())
    }
}

impl Default for ModelLimits {
    fn default() -> Self {
        Self::builtin()
    }
}
