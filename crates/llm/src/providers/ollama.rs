//! Ollama LLM provider implementation.
//!
//! This module provides integration with Ollama, a local LLM runtime.
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md
//!
//! Chat requests go through `/api/chat`, which applies the model's own chat
//! template to the role-tagged messages before generation.

use crate::client::{ChatRequest, LlmClient, LlmResponse, LlmUsage};
use mathtutor_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Ollama chat API request format.
#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [crate::client::ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

/// Sampling options understood by Ollama.
#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Ollama chat API response format.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    model: String,
    message: OllamaMessage,
    done: bool,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}

/// Ollama LLM client.
pub struct OllamaClient {
    /// Base URL for Ollama API
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new Ollama client with default settings.
    ///
    /// Default URL: http://localhost:11434
    pub fn new() -> Self {
        Self::with_base_url("http://localhost:11434")
    }

    /// Create a new Ollama client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    fn options_for(request: &ChatRequest) -> Option<OllamaOptions> {
        if request.temperature.is_none() && request.top_p.is_none() && request.max_tokens.is_none()
        {
            return None;
        }
        Some(OllamaOptions {
            temperature: request.temperature,
            top_p: request.top_p,
            num_predict: request.max_tokens,
        })
    }

    fn convert_response(&self, response: OllamaChatResponse) -> LlmResponse {
        let usage = LlmUsage::new(
            response.prompt_eval_count.unwrap_or(0),
            response.eval_count.unwrap_or(0),
        );

        LlmResponse {
            content: response.message.content,
            model: response.model,
            usage,
            done: response.done,
        }
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn chat(&self, request: &ChatRequest) -> AppResult<LlmResponse> {
        tracing::debug!(model = %request.model, messages = request.messages.len(), "Sending chat request to Ollama");

        let ollama_request = OllamaChatRequest {
            model: &request.model,
            messages: &request.messages,
            stream: false,
            options: Self::options_for(request),
        };
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ollama_request)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let ollama_response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Ollama response: {}", e)))?;

        tracing::debug!(
            eval_count = ollama_response.eval_count.unwrap_or(0),
            "Received chat completion from Ollama"
        );

        Ok(self.convert_response(ollama_response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_client_creation() {
        let client = OllamaClient::new();
        assert_eq!(client.provider_name(), "ollama");
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_options_omitted_when_unset() {
        let request = ChatRequest::new("qwen2.5-math").with_user("hi");
        assert!(OllamaClient::options_for(&request).is_none());
    }

    #[test]
    fn test_options_populated() {
        let request = ChatRequest::new("qwen2.5-math")
            .with_user("hi")
            .with_temperature(0.3)
            .with_max_tokens(256);

        let options = OllamaClient::options_for(&request).unwrap();
        assert_eq!(options.temperature, Some(0.3));
        assert_eq!(options.num_predict, Some(256));
    }

    #[test]
    fn test_response_conversion() {
        let client = OllamaClient::new();
        let raw = OllamaChatResponse {
            model: "qwen2.5-math".to_string(),
            message: OllamaMessage {
                content: "x = 4".to_string(),
            },
            done: true,
            prompt_eval_count: Some(42),
            eval_count: Some(7),
        };

        let response = client.convert_response(raw);
        assert_eq!(response.content, "x = 4");
        assert_eq!(response.usage.total_tokens, 49);
        assert!(response.done);
    }
}
