// AI orchestration data models
//
// Actions, completion payloads, interpreted results and the request/response
// shapes exchanged over the HTTP API.

use serde::{Deserialize, Serialize};

/// The AI operation requested by the caller
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Explain,
    #[serde(rename = "bugs")]
    FindBugs,
    Refactor,
    Optimize,
    Convert,
    Chat,
    CodeEdit,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::Explain,
        Action::FindBugs,
        Action::Refactor,
        Action::Optimize,
        Action::Convert,
        Action::Chat,
        Action::CodeEdit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Explain => "explain",
            Action::FindBugs => "bugs",
            Action::Refactor => "refactor",
            Action::Optimize => "optimize",
            Action::Convert => "convert",
            Action::Chat => "chat",
            Action::CodeEdit => "code-edit",
        }
    }

    /// Whether a successful result is a replacement document that must be
    /// staged for review rather than shown as text
    pub fn is_diff_shaped(&self) -> bool {
        matches!(self, Action::Refactor | Action::Optimize | Action::Convert)
    }

    /// Whether the primary input is a chat message rather than code
    pub fn is_conversational(&self) -> bool {
        matches!(self, Action::Chat | Action::CodeEdit)
    }
}

/// Message author role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// Chat message for AI completion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Outbound completion call payload
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Response from a completion call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    /// Generated content
    pub content: String,
    /// Tokens used (if reported)
    pub tokens_used: Option<u32>,
    /// Model that served the request
    pub model: String,
}

/// Selectable completion model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub id: String,
    pub label: String,
    pub is_default: bool,
}

/// Which branch of the code-edit protocol the model chose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionKind {
    Apply,
    Clarify,
    Noop,
}

/// Validated code-edit decision
///
/// Serializes to `{"action": "...", ...}` so it can be returned to clients as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum CodeEditDecision {
    /// Full replacement document proposed by the model (a proposal, never auto-applied)
    Apply { code: String, rationale: String },
    /// The model needs more information before editing
    Clarify { question: String, rationale: String },
    /// No change is needed
    Noop { rationale: String },
}

impl CodeEditDecision {
    pub fn kind(&self) -> DecisionKind {
        match self {
            CodeEditDecision::Apply { .. } => DecisionKind::Apply,
            CodeEditDecision::Clarify { .. } => DecisionKind::Clarify,
            CodeEditDecision::Noop { .. } => DecisionKind::Noop,
        }
    }

    pub fn rationale(&self) -> &str {
        match self {
            CodeEditDecision::Apply { rationale, .. }
            | CodeEditDecision::Clarify { rationale, .. }
            | CodeEditDecision::Noop { rationale } => rationale,
        }
    }
}

/// Typed result of interpreting a completion for a given action
#[derive(Debug, Clone, PartialEq)]
pub enum InterpretedResult {
    Explanation { text: String },
    BugReport { text: String },
    CodeDiff { code: String, raw_text: String },
    Optimize { code: String, explanation_text: String },
    ChatReply { text: String },
    CodeEdit(CodeEditDecision),
}

impl InterpretedResult {
    /// Action that produces this variant
    ///
    /// `CodeDiff` is shared by refactor and convert, so it reports `Refactor`;
    /// use [`InterpretedResult::matches`] to check against a concrete action.
    pub fn action(&self) -> Action {
        match self {
            InterpretedResult::Explanation { .. } => Action::Explain,
            InterpretedResult::BugReport { .. } => Action::FindBugs,
            InterpretedResult::CodeDiff { .. } => Action::Refactor,
            InterpretedResult::Optimize { .. } => Action::Optimize,
            InterpretedResult::ChatReply { .. } => Action::Chat,
            InterpretedResult::CodeEdit(_) => Action::CodeEdit,
        }
    }

    pub fn matches(&self, action: Action) -> bool {
        match self {
            InterpretedResult::CodeDiff { .. } => {
                matches!(action, Action::Refactor | Action::Convert)
            }
            other => other.action() == action,
        }
    }

    /// Replacement document carried by this result, if any
    pub fn proposed_code(&self) -> Option<&str> {
        match self {
            InterpretedResult::CodeDiff { code, .. } | InterpretedResult::Optimize { code, .. } => {
                Some(code)
            }
            InterpretedResult::CodeEdit(CodeEditDecision::Apply { code, .. }) => Some(code),
            _ => None,
        }
    }
}

// ============================================================================
// HTTP request / response shapes
// ============================================================================

/// Body of explain / bugs / refactor / optimize requests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeRequest {
    pub code: Option<String>,
    pub language: Option<String>,
}

/// Body of a convert request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertRequest {
    pub code: Option<String>,
    pub from_language: Option<String>,
    pub to_language: Option<String>,
}

/// Body of a chat request (single message or full history)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub messages: Option<Vec<ChatMessage>>,
    pub editor_content: Option<String>,
    pub current_code: Option<String>,
    pub language: Option<String>,
    pub model: Option<String>,
}

/// Body of a code-edit request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeEditRequest {
    pub message: Option<String>,
    pub current_code: Option<String>,
    pub language: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExplainResponse {
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BugsResponse {
    pub analysis: String,
}

/// Response of refactor and convert
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodeResponse {
    pub code: String,
    pub raw: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizeResponse {
    pub code: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatReplyResponse {
    pub message: String,
}
