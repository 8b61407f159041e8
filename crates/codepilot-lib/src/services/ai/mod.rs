// AI Service Module
//
// Prompt construction, completion transport, response interpretation and
// the structured code-edit protocol.

pub mod client;
pub mod config;
pub mod error;
pub mod groq;
pub mod interpreter;
pub mod prompts;
pub mod protocol;
pub mod service;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

use async_trait::async_trait;

pub use client::CompletionClient;
pub use config::AIConfig;
pub use error::{AIError, AIErrorCode, AIResult, ErrorKind};
pub use groq::GroqProvider;
pub use service::AIService;

use crate::models::ai::{CompletionRequest, CompletionResponse};

/// Trait for completion providers
/// The Groq chat-completions API is the production implementation
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Perform exactly one chat completion request
    async fn chat_completion(&self, request: &CompletionRequest) -> AIResult<CompletionResponse>;
}
