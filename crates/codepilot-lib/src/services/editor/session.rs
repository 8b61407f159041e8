// Editor Session
//
// Client-side controller for one open document. Runs AI actions against the
// current content, keeps the chat history and routes every replacement
// document through the diff gate for explicit approval.

use super::chat_session::ChatSession;
use super::diff_gate::DiffGate;
use super::document::DocumentStore;
use super::error::{EditorError, EditorResult};
use crate::models::ai::{Action, CodeEditDecision, InterpretedResult};
use crate::models::editor::{CodeAction, DiffSummary, PendingDiff};
use crate::services::ai::prompts::PromptInput;
use crate::services::ai::AIService;

/// What the user sees after an action completes
#[derive(Debug, Clone, PartialEq)]
pub enum EditorOutcome {
    /// Free text for the assistant panel (explanations, bug reports)
    Text(String),
    /// A replacement document was staged and awaits apply or cancel
    Staged {
        summary: DiffSummary,
        /// Prose that accompanied the code, if any
        note: Option<String>,
    },
    /// Chat answer, already recorded in the session history
    Reply(String),
    /// The model needs more information before editing
    Question(String),
    /// The model decided no change is needed
    NoChange(String),
}

#[derive(Debug)]
pub struct EditorSession {
    document_id: String,
    language: String,
    model: Option<String>,
    chat: ChatSession,
    diffs: DiffGate,
}

/// Shown when the model declines to edit without saying why
pub const NO_CHANGES_MESSAGE: &str = "No changes suggested.";

fn require_non_blank<'a>(value: &'a str, field: &str) -> EditorResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EditorError::EmptyInput(field.to_string()));
    }
    Ok(trimmed)
}

impl EditorSession {
    pub fn new(document_id: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            language: language.into(),
            model: None,
            chat: ChatSession::new(),
            diffs: DiffGate::new(),
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
    }

    /// Model used for chat and code-edit; `None` selects the server default
    pub fn set_model(&mut self, model: Option<String>) {
        self.model = model;
    }

    pub fn chat_session(&self) -> &ChatSession {
        &self.chat
    }

    pub fn clear_chat(&mut self) {
        self.chat.clear();
    }

    fn current_content<S: DocumentStore + ?Sized>(&self, store: &S) -> EditorResult<String> {
        store
            .content(&self.document_id)
            .ok_or_else(|| EditorError::DocumentNotFound(self.document_id.clone()))
    }

    fn stage(&mut self, original: String, proposed: String, action: Action, note: Option<String>) -> EditorOutcome {
        let summary = self
            .diffs
            .propose(&self.document_id, original, proposed, action)
            .summary();
        EditorOutcome::Staged { summary, note }
    }

    /// Run a single-turn code action against the current document
    ///
    /// Explanations and bug reports come back as text; refactor, optimize and
    /// convert results are staged for review.
    pub async fn run_code_action<S: DocumentStore + ?Sized>(
        &mut self,
        service: &AIService,
        store: &S,
        request: CodeAction,
    ) -> EditorResult<EditorOutcome> {
        let action = request.action();
        let code = self.current_content(store)?;
        require_non_blank(&code, "code")?;
        let target_language = match request.target_language() {
            Some(target) => Some(require_non_blank(target, "toLanguage")?),
            None => None,
        };

        let input = PromptInput {
            code: &code,
            language: &self.language,
            target_language,
            message: None,
        };
        let result = service.run(action, &input, None).await?;
        if !result.matches(action) {
            return Err(EditorError::UnexpectedResult {
                expected: action,
                actual: result.action(),
            });
        }

        if action.is_diff_shaped() {
            let proposed = result.proposed_code().unwrap_or_default().to_string();
            let note = match result {
                InterpretedResult::Optimize { explanation_text, .. } => Some(explanation_text),
                _ => None,
            };
            return Ok(self.stage(code, proposed, action, note));
        }

        match result {
            InterpretedResult::Explanation { text } | InterpretedResult::BugReport { text } => {
                Ok(EditorOutcome::Text(text))
            }
            other => Err(EditorError::UnexpectedResult {
                expected: action,
                actual: other.action(),
            }),
        }
    }

    /// Send a chat turn with the current document as context
    pub async fn chat<S: DocumentStore + ?Sized>(
        &mut self,
        service: &AIService,
        store: &S,
        message: &str,
    ) -> EditorResult<EditorOutcome> {
        let message = require_non_blank(message, "message")?;
        let code = store.content(&self.document_id).unwrap_or_default();
        let reply = self
            .chat
            .send(service, message, Some(code.as_str()), self.model.as_deref())
            .await?;
        Ok(EditorOutcome::Reply(reply))
    }

    /// Ask for a structured edit; an `Apply` decision is staged, never committed
    pub async fn request_edit<S: DocumentStore + ?Sized>(
        &mut self,
        service: &AIService,
        store: &S,
        message: &str,
    ) -> EditorResult<EditorOutcome> {
        let message = require_non_blank(message, "message")?;
        let code = self.current_content(store)?;
        let decision = service
            .code_edit(Some(message), Some(code.as_str()), Some(self.language.as_str()), self.model.as_deref())
            .await?;

        let outcome = match decision {
            CodeEditDecision::Apply { code: proposed, rationale } => {
                let note = (!rationale.is_empty()).then_some(rationale);
                self.stage(code, proposed, Action::CodeEdit, note)
            }
            CodeEditDecision::Clarify { question, .. } => EditorOutcome::Question(question),
            CodeEditDecision::Noop { rationale } if rationale.trim().is_empty() => {
                EditorOutcome::NoChange(NO_CHANGES_MESSAGE.to_string())
            }
            CodeEditDecision::Noop { rationale } => EditorOutcome::NoChange(rationale),
        };
        Ok(outcome)
    }

    pub fn pending(&self) -> Option<&PendingDiff> {
        self.diffs.pending(&self.document_id)
    }

    pub fn pending_summary(&self) -> Option<DiffSummary> {
        self.diffs.summary(&self.document_id)
    }

    /// Commit the staged proposal into the document
    pub fn apply_pending<S: DocumentStore + ?Sized>(&mut self, store: &mut S) -> EditorResult<PendingDiff> {
        self.diffs.apply(&self.document_id, store)
    }

    /// Discard the staged proposal
    pub fn cancel_pending(&mut self) -> Option<PendingDiff> {
        self.diffs.cancel(&self.document_id)
    }
}
