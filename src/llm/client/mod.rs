#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::LlmConfig;
use crate::llm::{ChatMessage, CompletionModel, LlmError};

const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);
const EXPONENTIAL_BACKOFF_BASE: u32 = 2;

/// Blocking client for an OpenAI-compatible chat-completions endpoint
#[derive(Clone)]
pub struct ChatClient {
    endpoint: Url,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: u32,
    agent: ureq::Agent,
    retry_attempts: u32,
    retry_backoff: Duration,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatClient {
    /// Build a client from configuration, reading the API key from the configured variable
    #[inline]
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let endpoint = config
            .endpoint_url()
            .map_err(|e| LlmError::Configuration(e.to_string()))?;

        let api_key = env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            debug!(
                "{} is not set; sending requests without authorization",
                config.api_key_env
            );
        }

        Ok(Self {
            endpoint,
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            agent: build_agent(Duration::from_secs(config.timeout_seconds)),
            retry_attempts: config.retry_attempts.max(1),
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = build_agent(timeout);
        self
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts.max(1);
        self
    }

    /// Base delay before the first retry, doubled for every further attempt
    #[inline]
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    #[inline]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    #[inline]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a minimal prompt to verify the endpoint, credentials and model
    #[inline]
    pub fn health_check(&self) -> Result<(), LlmError> {
        debug!("Performing health check for {} at {}", self.model, self.endpoint);

        self.complete(&[ChatMessage::user("ping")])?;

        info!(
            "Health check passed for {} with model {}",
            self.endpoint, self.model
        );
        Ok(())
    }

    fn send_with_retry(&self, body: &str) -> Result<String, LlmError> {
        let mut last_error = None;

        for attempt in 1..=self.retry_attempts {
            debug!("Model request attempt {}/{}", attempt, self.retry_attempts);

            match self.send_once(body) {
                Ok(response_text) => {
                    debug!("Request succeeded on attempt {}", attempt);
                    return Ok(response_text);
                }
                Err(error) if error.is_retryable() => {
                    warn!(
                        "{}, attempt {}/{}",
                        error, attempt, self.retry_attempts
                    );
                    last_error = Some(error);

                    if attempt < self.retry_attempts {
                        let delay = self
                            .retry_backoff
                            .saturating_mul(EXPONENTIAL_BACKOFF_BASE.saturating_pow(attempt - 1));
                        debug!("Waiting {:?} before retry", delay);
                        std::thread::sleep(delay);
                    }
                }
                Err(error) => {
                    warn!("Non-retryable error: {}", error);
                    return Err(error);
                }
            }
        }

        error!("All retry attempts failed for request to {}", self.endpoint);

        Err(match last_error {
            Some(last) => LlmError::RetriesExhausted {
                attempts: self.retry_attempts,
                last: Box::new(last),
            },
            None => LlmError::Request("no request attempts were made".to_string()),
        })
    }

    fn send_once(&self, body: &str) -> Result<String, LlmError> {
        let mut request = self
            .agent
            .post(self.endpoint.as_str())
            .header("Content-Type", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let mut response = request.send(body)?;
        Ok(response.body_mut().read_to_string()?)
    }
}

impl CompletionModel for ChatClient {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        debug!(
            "Requesting completion for {} messages from {}",
            messages.len(),
            self.model
        );

        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| LlmError::Request(format!("failed to serialize request: {e}")))?;

        let response_text = self.send_with_retry(&body)?;

        let response: ChatCompletionResponse = serde_json::from_str(&response_text)
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_owned())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                LlmError::InvalidResponse("response contained no message content".to_string())
            })?;

        debug!("Received {} bytes of completion", content.len());
        Ok(content)
    }
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .field("retry_attempts", &self.retry_attempts)
            .field("retry_backoff", &self.retry_backoff)
            .finish_non_exhaustive()
    }
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into()
}
