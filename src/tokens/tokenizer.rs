//! Tokenizer implementations and loaders

use crate::error::{Result, SummaryError};
use std::collections::HashMap;
use std::sync::Arc;
use tiktoken_rs::CoreBPE;

/// Encoding assumed for registered models that do not name one
pub const DEFAULT_ENCODING: &str = "cl100k_base";

/// Tiktoken encodings that can be named explicitly
pub const KNOWN_ENCODINGS: &[&str] = &["cl100k_base", "p50k_base", "p50k_edit", "r50k_base"];

/// Model-specific tokenizer producing token ids for text
pub trait Tokenizer: Send + Sync {
    /// Encode text into its ordered token ids
    fn encode(&self, text: &str) -> Vec<usize>;
}

/// Builds the tokenizer for a model on first use
pub trait TokenizerLoader: Send + Sync {
    fn load(&self, model: &str) -> Result<Arc<dyn Tokenizer>>;
}

/// Tiktoken BPE tokenizer (cl100k_base, o200k_base, ...)
pub struct TiktokenTokenizer {
    bpe: CoreBPE,
}

impl TiktokenTokenizer {
    /// Resolve the BPE encoding used by `model`
    pub fn for_model(model: &str) -> Result<Self> {
        let bpe = tiktoken_rs::get_bpe_from_model(&model.to_lowercase()).map_err(|e| {
            SummaryError::Tokenizer {
                model: model.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self { bpe })
    }

    /// Use a named encoding regardless of the model
    pub fn for_encoding(model: &str, encoding: &str) -> Result<Self> {
        let bpe = match encoding {
            "cl100k_base" => tiktoken_rs::cl100k_base(),
            "p50k_base" => tiktoken_rs::p50k_base(),
            "p50k_edit" => tiktoken_rs::p50k_edit(),
            "r50k_base" => tiktoken_rs::r50k_base(),
            other => {
                return Err(SummaryError::Tokenizer {
                    model: model.to_string(),
                    reason: format!("Unknown encoding {}", other),
                })
            }
        }
        .map_err(|e| SummaryError::Tokenizer {
            model: model.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { bpe })
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn encode(&self, text: &str) -> Vec<usize> {
        self.bpe.encode_with_special_tokens(text)
    }
}

/// Loads tiktoken encodings by model name.
///
/// Models with an explicit encoding (registered models tiktoken cannot name)
/// use it; all others are resolved by tiktoken. Names are case-insensitive.
#[derive(Debug, Default, Clone)]
pub struct TiktokenLoader {
    encodings: HashMap<String, String>,
}

impl TiktokenLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenize `model` with `encoding`
    pub fn with_encoding(mut self, model: &str, encoding: impl Into<String>) -> Self {
        self.encodings.insert(model.to_lowercase(), encoding.into());
        self
    }

    pub fn encoding_for(&self, model: &str) -> Option<&str> {
        self.encodings.get(&model.to_lowercase()).map(String::as_str)
    }
}

impl TokenizerLoader for TiktokenLoader {
    fn load(&self, model: &str) -> Result<Arc<dyn Tokenizer>> {
        let tokenizer = match self.encoding_for(model) {
            Some(encoding) => TiktokenTokenizer::for_encoding(model, encoding)?,
            None => TiktokenTokenizer::for_model(model)?,
        };
        Ok(Arc::new(tokenizer))
    }
}

/// One token per whitespace-separated word.
///
/// Ids are an FNV-1a hash of the word, so equal words share an id.
#[derive(Debug, Default, Clone, Copy)]
pub struct WordTokenizer;

impl WordTokenizer {
    fn word_id(word: &str) -> usize {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in word.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        hash as usize
    }
}

impl Tokenizer for WordTokenizer {
    fn encode(&self, text: &str) -> Vec<usize> {
        text.split_whitespace().map(Self::word_id).collect()
    }
}

/// Hands out the word tokenizer for every model
#[derive(Debug, Default, Clone, Copy)]
pub struct WordTokenizerLoader;

impl TokenizerLoader for WordTokenizerLoader {
    fn load(&self, _model: &str) -> Result<Arc<dyn Tokenizer>> {
        Ok(Arc::new(WordTokenizer))
    }
}
