//! Layered configuration: defaults, optional TOML file, environment

use crate::chunking::DEFAULT_CHUNK_SIZE;
use crate::completion::CompletionConfig;
use crate::error::{Result, SummaryError};
use crate::input::TextSource;
use crate::summarizer::SummarizerOptions;
use crate::tokens::{ModelLimits, TiktokenLoader, TokenCounter, DEFAULT_ENCODING, KNOWN_ENCODINGS};
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "summarize";

/// Prefix of environment overrides, e.g. `SUMMARIZE_CHUNK_SIZE`
pub const ENV_PREFIX: &str = "SUMMARIZE";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Model used for tokenization and completion
    #[serde(default = "default_model")]
    pub model: String,

    /// Line delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Token budget per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Chat completions endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub temperature: Option<f32>,

    /// Thread each summary into the next prompt
    #[serde(default = "default_chain_context")]
    pub chain_context: bool,

    /// Parallel calls when context chaining is off
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Extra models: context window and optional tiktoken encoding
    #[serde(default)]
    pub models: HashMap<String, ModelEntry>,
}

/// A `[models]` entry: `name = 8192` or
/// `name = { max_tokens = 8192, encoding = "p50k_base" }`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ModelEntry {
    MaxTokens(usize),
    Detailed {
        max_tokens: usize,
        #[serde(default = "default_encoding")]
        encoding: String,
    },
}

impl ModelEntry {
    pub fn max_tokens(&self) -> usize {
        match self {
            ModelEntry::MaxTokens(max_tokens) => *max_tokens,
            ModelEntry::Detailed { max_tokens, .. } => *max_tokens,
        }
    }

    pub fn encoding(&self) -> &str {
        match self {
            ModelEntry::MaxTokens(_) => DEFAULT_ENCODING,
            ModelEntry::Detailed { encoding, .. } => encoding,
        }
    }
}

fn default_model() -> String { "gpt-4-turbo".to_string() }
fn default_delimiter() -> String { "\n".to_string() }
fn default_chunk_size() -> usize { DEFAULT_CHUNK_SIZE }
fn default_endpoint() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_timeout_secs() -> u64 { 300 }
fn default_chain_context() -> bool { true }
fn default_max_concurrency() -> usize { 4 }
fn default_encoding() -> String { DEFAULT_ENCODING.to_string() }

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            delimiter: default_delimiter(),
            chunk_size: default_chunk_size(),
            endpoint: default_endpoint(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            temperature: None,
            chain_context: default_chain_context(),
            max_concurrency: default_max_concurrency(),
            models: HashMap::new(),
        }
    }
}

impl Config {
    /// Load from `path` (required) or the default file (optional), then the
    /// environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config: Config = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(SummaryError::Configuration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.delimiter.is_empty() {
            return Err(SummaryError::Configuration(
                "delimiter must not be empty".to_string(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(SummaryError::Configuration(
                "max_concurrency must be greater than zero".to_string(),
            ));
        }
        for (model, entry) in &self.models {
            if !KNOWN_ENCODINGS.contains(&entry.encoding()) {
                return Err(SummaryError::Configuration(format!(
                    "Model {} uses unknown encoding {} (expected one of {})",
                    model,
                    entry.encoding(),
                    KNOWN_ENCODINGS.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Built-in context windows plus any configured models
    pub fn model_limits(&self) -> ModelLimits {
        self.models
            .iter()
            .fold(ModelLimits::builtin(), |limits, (model, entry)| {
                limits.with_limit(model.as_str(), entry.max_tokens())
            })
    }

    /// Tiktoken loader that knows the encodings of configured models
    pub fn tokenizer_loader(&self) -> TiktokenLoader {
        self.models
            .iter()
            .fold(TiktokenLoader::new(), |loader, (model, entry)| {
                loader.with_encoding(model, entry.encoding())
            })
    }

    pub fn token_counter(&self) -> TokenCounter {
        TokenCounter::new(std::sync::Arc::new(self.tokenizer_loader()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn completion_config(&self) -> CompletionConfig {
        CompletionConfig {
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            timeout: self.timeout(),
            temperature: self.temperature,
        }
    }

    pub fn summarizer_options(&self) -> SummarizerOptions {
        SummarizerOptions {
            chain_context: self.chain_context,
            max_concurrency: self.max_concurrency,
        }
    }
}

/// Expand `\n`, `\t` and `\r` escapes typed on a command line
pub fn unescape_delimiter(raw: &str) -> String {
    raw.replace("\\r", "\r")
        .replace("\\n", "\n")
        .replace("\\t", "\t")
}

/// Settings given on the command line, applied over the loaded config
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub model: Option<String>,
    pub delimiter: Option<String>,
    pub chunk_size: Option<usize>,
    pub endpoint: Option<String>,
    pub independent: bool,
    pub api_key: Option<String>,
    /// Takes precedence over `api_key`
    pub api_key_source: Option<TextSource>,
}

impl CliOverrides {
    /// Apply the overrides; a run without any API key is a configuration error
    pub fn apply(&self, mut config: Config) -> Result<Config> {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(delimiter) = &self.delimiter {
            config.delimiter = unescape_delimiter(delimiter);
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if self.independent {
            config.chain_context = false;
        }

        let api_key = match (&self.api_key_source, &self.api_key) {
            (Some(source), _) => Some(source.resolve()?),
            (None, Some(key)) => Some(key.clone()),
            (None, None) => None,
        };
        if let Some(key) = api_key {
            config.api_key = Some(SecretString::new(key.trim().to_string()));
        }
        if config.api_key.is_none() {
            return Err(SummaryError::Configuration(
                "No API key provided (use --api-key, --api-key-file or OPENAI_API_KEY)"
                    .to_string(),
            ));
        }

        config.validate()?;
        Ok(config)
    }
}
