//! LLM integration crate for the Math Tutor Agent.
//!
//! This crate provides a provider-agnostic abstraction for interacting with
//! Large Language Models through a unified trait-based interface. Requests
//! carry role-tagged chat messages; the provider is responsible for applying
//! the model's chat template.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (default)
//!
//! # Example
//! ```no_run
//! use mathtutor_llm::{ChatRequest, LlmClient, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = ChatRequest::new("qwen2.5-math")
//!     .with_system("You are a math tutor.")
//!     .with_user("Solve 2x + 3 = 11");
//! let response = client.chat(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{ChatMessage, ChatRequest, ChatRole, LlmClient, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::OllamaClient;
