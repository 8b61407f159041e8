// Completion Client
//
// Single place for outbound completion calls. Holds the provider, the
// default model and the token budget; immutable once built, so it is shared
// behind an `Arc` without locking. One request, one attempt, no retries.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::config::{AIConfig, TEMPERATURE};
use super::groq::GroqProvider;
use super::{AIError, AIResult, CompletionProvider};
use crate::models::ai::{ChatMessage, CompletionRequest};

/// Process-wide client, set by the first successful [`CompletionClient::shared`] call
static SHARED_CLIENT: OnceCell<Arc<CompletionClient>> = OnceCell::new();

pub struct CompletionClient {
    provider: Arc<dyn CompletionProvider>,
    default_model: String,
    max_tokens: u32,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("provider", &self.provider.name())
            .field("default_model", &self.default_model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl CompletionClient {
    /// Build a Groq-backed client; fails when no credential is configured
    pub fn new(config: &AIConfig) -> AIResult<Self> {
        let api_key = config.api_key.clone().ok_or(AIError::NotConfigured)?;
        let provider = GroqProvider::new(config.base_url.clone(), api_key);
        Ok(Self::with_provider(Arc::new(provider), config))
    }

    /// Build a client around an arbitrary provider
    pub fn with_provider(provider: Arc<dyn CompletionProvider>, config: &AIConfig) -> Self {
        Self {
            provider,
            default_model: config.default_model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    /// Lazily construct the process-wide client
    ///
    /// The credential is checked on every call, so a missing key is always
    /// reported as [`AIError::NotConfigured`]. Once built, the same instance is
    /// returned for the life of the process.
    pub fn shared(config: &AIConfig) -> AIResult<Arc<CompletionClient>> {
        if !config.is_configured() {
            return Err(AIError::NotConfigured);
        }
        SHARED_CLIENT
            .get_or_try_init(|| {
                log::info!("[ai] completion client initialized, default model={}", config.default_model);
                Self::new(config).map(Arc::new)
            })
            .cloned()
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Assemble the outbound payload for an ordered message list
    pub fn build_request(&self, messages: Vec<ChatMessage>, model: Option<&str>) -> CompletionRequest {
        let model = model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.default_model.as_str())
            .to_string();
        CompletionRequest {
            model,
            messages,
            max_tokens: self.max_tokens,
            temperature: TEMPERATURE,
        }
    }

    /// System + user completion
    pub async fn complete(
        &self,
        system_content: &str,
        user_content: &str,
        model: Option<&str>,
        log_context: &str,
    ) -> AIResult<String> {
        let messages = vec![ChatMessage::system(system_content), ChatMessage::user(user_content)];
        self.send(self.build_request(messages, model), log_context).await
    }

    /// Issue one completion call and return the raw text
    pub async fn send(&self, request: CompletionRequest, log_context: &str) -> AIResult<String> {
        match self.provider.chat_completion(&request).await {
            Ok(response) => {
                log::info!(
                    "[ai] {} success, model={}, tokens={:?}",
                    log_context,
                    request.model,
                    response.tokens_used
                );
                Ok(response.content)
            }
            Err(e) => {
                log::error!("[ai] {} {} error: {}", log_context, self.provider.name(), e);
                Err(e)
            }
        }
    }
}
