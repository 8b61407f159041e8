// AI Service
//
// Orchestration boundary for every AI action: validate the request, build
// the prompt, issue exactly one completion call and interpret the answer.
// Errors leaving this service are always `AIError`, classified by `kind()`.

use std::sync::Arc;

use super::client::CompletionClient;
use super::config::AIConfig;
use super::interpreter::{extract_code_block, interpret, split_optimized};
use super::prompts::{build_prompt, PromptInput};
use super::protocol::parse_code_edit;
use super::{AIError, AIResult};
use crate::models::ai::{
    Action, BugsResponse, ChatMessage, ChatReplyResponse, CodeEditDecision, CodeResponse,
    ExplainResponse, InterpretedResult, MessageRole, ModelInfo, OptimizeResponse,
};

/// Language assumed when the caller does not name one
pub const DEFAULT_LANGUAGE: &str = "text";

fn language_or_default(language: Option<&str>) -> &str {
    language
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE)
}

/// Reject absent or empty required fields before any provider call
fn require<'a>(value: Option<&'a str>, field: &str) -> AIResult<&'a str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AIError::MissingField(field.to_string())),
    }
}

/// Main AI service
#[derive(Debug, Clone)]
pub struct AIService {
    config: AIConfig,
    /// `None` while no credential is configured
    client: Option<Arc<CompletionClient>>,
}

impl AIService {
    /// Create the service, building the shared completion client when a
    /// credential is available
    pub fn from_config(config: AIConfig) -> Self {
        let client = match CompletionClient::shared(&config) {
            Ok(client) => Some(client),
            Err(e) => {
                log::warn!("[ai] completion client unavailable: {}", e);
                None
            }
        };
        Self { config, client }
    }

    /// Create with an explicit client (for testing and embedding)
    pub fn with_client(config: AIConfig, client: Arc<CompletionClient>) -> Self {
        Self {
            config,
            client: Some(client),
        }
    }

    /// Create a service that answers every action with a configuration error
    pub fn unconfigured(config: AIConfig) -> Self {
        Self { config, client: None }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub fn config(&self) -> &AIConfig {
        &self.config
    }

    /// Models clients may choose from
    pub fn models(&self) -> Vec<ModelInfo> {
        self.config.selectable_models()
    }

    fn client(&self) -> AIResult<&CompletionClient> {
        self.client.as_deref().ok_or(AIError::NotConfigured)
    }

    // =========================================================================
    // Generic dispatch
    // =========================================================================

    /// Validate inputs for `action`; nothing is sent when this fails
    pub fn validate(action: Action, input: &PromptInput<'_>) -> AIResult<()> {
        if action.is_conversational() {
            require(input.message, "message")?;
        } else {
            require(Some(input.code), "code")?;
        }
        if action == Action::Convert {
            require(input.target_language, "toLanguage")?;
        }
        Ok(())
    }

    /// One completion round trip for a single-turn action, returning raw text
    pub async fn complete_action(
        &self,
        action: Action,
        input: &PromptInput<'_>,
        model: Option<&str>,
    ) -> AIResult<String> {
        Self::validate(action, input)?;
        let client = self.client()?;
        let prompt = build_prompt(action, input);
        client
            .complete(&prompt.system, &prompt.user, model, action.as_str())
            .await
    }

    /// Run `action` and interpret the answer
    pub async fn run(
        &self,
        action: Action,
        input: &PromptInput<'_>,
        model: Option<&str>,
    ) -> AIResult<InterpretedResult> {
        let raw = self.complete_action(action, input, model).await?;
        interpret(action, raw)
    }

    // =========================================================================
    // Actions
    // =========================================================================

    pub async fn explain(&self, code: Option<&str>, language: Option<&str>) -> AIResult<ExplainResponse> {
        let input = PromptInput {
            code: require(code, "code")?,
            language: language_or_default(language),
            ..PromptInput::default()
        };
        let explanation = self.complete_action(Action::Explain, &input, None).await?;
        Ok(ExplainResponse { explanation })
    }

    pub async fn find_bugs(&self, code: Option<&str>, language: Option<&str>) -> AIResult<BugsResponse> {
        let input = PromptInput {
            code: require(code, "code")?,
            language: language_or_default(language),
            ..PromptInput::default()
        };
        let analysis = self.complete_action(Action::FindBugs, &input, None).await?;
        Ok(BugsResponse { analysis })
    }

    pub async fn refactor(&self, code: Option<&str>, language: Option<&str>) -> AIResult<CodeResponse> {
        let input = PromptInput {
            code: require(code, "code")?,
            language: language_or_default(language),
            ..PromptInput::default()
        };
        let raw = self.complete_action(Action::Refactor, &input, None).await?;
        Ok(CodeResponse {
            code: extract_code_block(&raw),
            raw,
        })
    }

    pub async fn optimize(&self, code: Option<&str>, language: Option<&str>) -> AIResult<OptimizeResponse> {
        let input = PromptInput {
            code: require(code, "code")?,
            language: language_or_default(language),
            ..PromptInput::default()
        };
        let raw = self.complete_action(Action::Optimize, &input, None).await?;
        let (code, explanation) = split_optimized(&raw);
        Ok(OptimizeResponse { code, explanation })
    }

    pub async fn convert(
        &self,
        code: Option<&str>,
        from_language: Option<&str>,
        to_language: Option<&str>,
    ) -> AIResult<CodeResponse> {
        let input = PromptInput {
            code: require(code, "code")?,
            language: language_or_default(from_language),
            target_language: Some(require(to_language, "toLanguage")?),
            message: None,
        };
        let raw = self.complete_action(Action::Convert, &input, None).await?;
        Ok(CodeResponse {
            code: extract_code_block(&raw),
            raw,
        })
    }

    /// Single-message chat with the editor content as context
    pub async fn chat(
        &self,
        message: Option<&str>,
        editor_content: Option<&str>,
        model: Option<&str>,
    ) -> AIResult<ChatReplyResponse> {
        let input = PromptInput {
            code: editor_content.unwrap_or_default(),
            language: DEFAULT_LANGUAGE,
            target_language: None,
            message: Some(require(message, "message")?),
        };
        let message = self.complete_action(Action::Chat, &input, model).await?;
        Ok(ChatReplyResponse { message })
    }

    /// Chat with the full exchange history
    ///
    /// Outbound messages are `[system] + messages`, where `messages` already
    /// ends with the new user turn. The current document lives in the system
    /// content only; caller-supplied system messages are dropped.
    pub async fn chat_with_history(
        &self,
        messages: &[ChatMessage],
        current_code: Option<&str>,
        model: Option<&str>,
    ) -> AIResult<ChatReplyResponse> {
        let Some(last) = messages.last() else {
            return Err(AIError::MissingField("message".to_string()));
        };
        require(Some(last.content.as_str()), "message")?;

        let client = self.client()?;
        let input = PromptInput {
            code: current_code.unwrap_or_default(),
            language: DEFAULT_LANGUAGE,
            target_language: None,
            message: Some(last.content.as_str()),
        };
        let prompt = build_prompt(Action::Chat, &input);

        let mut outbound = Vec::with_capacity(messages.len() + 1);
        outbound.push(ChatMessage::system(prompt.system));
        outbound.extend(
            messages
                .iter()
                .filter(|m| m.role != MessageRole::System)
                .cloned(),
        );

        let request = client.build_request(outbound, model);
        let message = client.send(request, Action::Chat.as_str()).await?;
        Ok(ChatReplyResponse { message })
    }

    /// Ask for a structured code edit against the current document
    pub async fn code_edit(
        &self,
        message: Option<&str>,
        current_code: Option<&str>,
        language: Option<&str>,
        model: Option<&str>,
    ) -> AIResult<CodeEditDecision> {
        let input = PromptInput {
            code: current_code.unwrap_or_default(),
            language: language_or_default(language),
            target_language: None,
            message: Some(require(message, "message")?),
        };
        let raw = self.complete_action(Action::CodeEdit, &input, model).await?;
        parse_code_edit(&raw)
    }
}
