//! Generation backend trait and the request/response records it exchanges.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single-shot completion request handed to a [`GenerationBackend`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    /// The fully assembled prompt text.
    pub prompt: String,
    /// Optional system message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum number of tokens to generate.
    pub max_tokens: u32,
    /// Nucleus sampling probability mass.
    pub top_p: f32,
}

impl GenerationRequest {
    /// Create a request with default sampling parameters
    /// (temperature 0.7, 1024 max tokens, top-p 1.0).
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_message: None,
            temperature: 0.7,
            max_tokens: 1024,
            top_p: 1.0,
        }
    }

    /// Set the system message.
    pub fn with_system_message(mut self, message: impl Into<String>) -> Self {
        self.system_message = Some(message.into());
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Token accounting reported by a backend.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub prompt: u32,
    /// Tokens in the completion.
    pub completion: u32,
    /// Total tokens.
    pub total: u32,
}

/// A completion returned by a [`GenerationBackend`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GenerationResponse {
    /// The generated text.
    pub text: String,
    /// Token usage, when the backend reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    /// Why generation stopped, e.g. `"stop"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    /// The model that produced the text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// A text-generation backend.
///
/// The [`QueryEngine`](crate::QueryEngine) only needs single-shot completion.
/// Implementations report failures as
/// [`RagError::GenerationError`](crate::RagError::GenerationError); the engine
/// returns them unchanged.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate a completion for the request.
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults() {
        let request = GenerationRequest::new("prompt");
        assert_eq!(request.prompt, "prompt");
        assert_eq!(request.system_message, None);
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.max_tokens, 1024);
        assert_eq!(request.top_p, 1.0);
    }

    #[test]
    fn request_builder_overrides_sampling() {
        let request = GenerationRequest::new("prompt")
            .with_system_message("Answer briefly.")
            .with_temperature(0.0)
            .with_max_tokens(64);
        assert_eq!(request.system_message.as_deref(), Some("Answer briefly."));
        assert_eq!(request.temperature, 0.0);
        assert_eq!(request.max_tokens, 64);
        assert_eq!(request.top_p, 1.0);
    }
}
