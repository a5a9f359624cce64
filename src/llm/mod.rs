// Language model module
// Chat-completion client with retries and prompt assembly from retrieved context

pub mod client;
pub mod prompt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::ChatClient;
pub use prompt::{DEFAULT_SYSTEM_PROMPT, build_messages, format_context};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[inline]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    #[inline]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[inline]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Model endpoint rejected the request: HTTP {0}")]
    ClientStatus(u16),

    #[error("Model endpoint is rate limiting requests: HTTP 429")]
    RateLimited,

    #[error("Model endpoint failed: HTTP {0}")]
    ServerStatus(u16),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Invalid response from model endpoint: {0}")]
    InvalidResponse(String),

    #[error("Model client misconfigured: {0}")]
    Configuration(String),

    #[error("Model request failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<LlmError> },
}

impl LlmError {
    /// Whether repeating the same request may succeed
    ///
    /// Transport failures, 5xx and 429 are transient. Other 4xx responses
    /// (bad request, authentication, missing model) are permanent.
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::ServerStatus(_) | Self::Transport(_)
        )
    }
}

impl From<ureq::Error> for LlmError {
    #[inline]
    fn from(error: ureq::Error) -> Self {
        match error {
            ureq::Error::StatusCode(429) => Self::RateLimited,
            ureq::Error::StatusCode(status) if status >= 500 => Self::ServerStatus(status),
            ureq::Error::StatusCode(status) => Self::ClientStatus(status),
            ureq::Error::ConnectionFailed
            | ureq::Error::HostNotFound
            | ureq::Error::Timeout(_)
            | ureq::Error::Io(_) => Self::Transport(error.to_string()),
            other => Self::Request(other.to_string()),
        }
    }
}

/// Anything that can turn a conversation into the next assistant message
pub trait CompletionModel {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

impl<M: CompletionModel + ?Sized> CompletionModel for &M {
    #[inline]
    fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        (**self).complete(messages)
    }
}
