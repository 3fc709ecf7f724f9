//! Token measurement for context-window accounting

pub mod counter;
pub mod limits;
pub mod tokenizer;

pub use counter::{TokenCounter, TokenInfo};
pub use limits::{ModelLimits, MODEL_CONTEXT_WINDOWS};
pub use tokenizer::{
    TiktokenLoader, TiktokenTokenizer, Tokenizer, TokenizerLoader, WordTokenizer,
    WordTokenizerLoader, DEFAULT_ENCODING, KNOWN_ENCODINGS,
};
