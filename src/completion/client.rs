//! Single-turn completion calls against an OpenAI-compatible API

use super::models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::error::{Result, SummaryError};
use crate::tokens::{ModelLimits, TokenCounter};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Tokens reserved below the model maximum for an assembled prompt
pub const PROMPT_SAFETY_MARGIN: usize = 10;

/// Turns a prompt into model output
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Configuration for the HTTP completion client
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub endpoint: String,
    pub api_key: Option<SecretString>,
    pub model: String,
    pub timeout: Duration,
    pub temperature: Option<f32>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            model: "gpt-4-turbo".to_string(),
            timeout: Duration::from_secs(300),
            temperature: None,
        }
    }
}

/// Completion client speaking the chat-completions protocol.
///
/// Each call is attempted exactly once.
pub struct OpenAiCompletionClient {
    http: Client,
    config: CompletionConfig,
    counter: Arc<TokenCounter>,
    limits: ModelLimits,
}

impl OpenAiCompletionClient {
    pub fn new(
        config: CompletionConfig,
        counter: Arc<TokenCounter>,
        limits: ModelLimits,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SummaryError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config,
            counter,
            limits,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Reject prompts the model cannot accept
    fn check_prompt_size(&self, prompt: &str) -> Result<usize> {
        let model = &self.config.model;
        let limit = self
            .limits
            .max_tokens(model)?
            .saturating_sub(PROMPT_SAFETY_MARGIN);
        let tokens = self.counter.count(prompt, model)?;

        if tokens > limit {
            return Err(SummaryError::ContentExceedsMaximum {
                model: model.clone(),
                tokens,
                limit,
            });
        }
        Ok(tokens)
    }
}

#[async_trait]
impl Completion for OpenAiCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let prompt_tokens = self.check_prompt_size(prompt)?;

        debug!(
            "Requesting completion from {} ({} prompt tokens)",
            self.config.model, prompt_tokens
        );

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: self.config.temperature,
        };

        let mut req = self.http.post(&self.config.endpoint).json(&request);
        if let Some(api_key) = &self.config.api_key {
            req = req.bearer_auth(api_key.expose_secret());
        }

        let response = req.send().await.map_err(|e| {
            error!("Completion request to {} failed: {}", self.config.endpoint, e);
            SummaryError::RequestFailed(format!(
                "Completion request to {} failed: {}",
                self.config.endpoint, e
            ))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SummaryError::UpstreamError(format!(
                "Status {}: {}",
                status, body
            )));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| SummaryError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        body.first_content().ok_or_else(|| {
            SummaryError::InvalidResponse("No completion content in response".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::WordTokenizerLoader;

    fn client(model: &str, limits: ModelLimits) -> OpenAiCompletionClient {
        let config = CompletionConfig {
            endpoint: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            model: model.to_string(),
            ..CompletionConfig::default()
        };
        let counter = Arc::new(TokenCounter::new(Arc::new(WordTokenizerLoader)));
        OpenAiCompletionClient::new(config, counter, limits).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = CompletionConfig::default();
        assert_eq!(config.model, "gpt-4-turbo");
        assert!(config.api_key.is_none());
        assert!(config.temperature.is_none());
    }

    #[test]
    fn test_prompt_within_limit() {
        let client = client("small", ModelLimits::builtin().with_limit("small", 20));
        assert_eq!(client.check_prompt_size(&vec!["w"; 10].join(" ")).unwrap(), 10);
    }

    #[tokio::test]
    async fn test_prompt_over_limit_rejected_before_request() {
        let client = client("small", ModelLimits::builtin().with_limit("small", 20));
        let result = client.complete(&vec!["w"; 11].join(" ")).await;
        match result {
            Err(SummaryError::ContentExceedsMaximum { tokens, limit, .. }) => {
                assert_eq!(tokens, 11);
                assert_eq!(limit, 10);
            }
            other => panic!("Expected ContentExceedsMaximum, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_model_rejected() {
        let client = client("mystery", ModelLimits::builtin());
        let result = client.complete("hello").await;
        assert!(matches!(result, Err(SummaryError::UnknownModel(_))));
    }
}
