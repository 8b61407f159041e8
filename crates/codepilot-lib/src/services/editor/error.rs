// Editor Session Error Types

use thiserror::Error;

use crate::models::ai::Action;
use crate::services::ai::{AIError, ErrorKind};

/// Editor session error
#[derive(Error, Debug)]
pub enum EditorError {
    /// The orchestration call failed
    #[error(transparent)]
    AI(#[from] AIError),

    /// A required input was blank
    #[error("{0} required")]
    EmptyInput(String),

    /// The document store has no entry for the session's document
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Apply was requested with nothing staged
    #[error("No pending change for document: {0}")]
    NoPendingDiff(String),

    /// The interpreted result does not belong to the action that was run
    #[error("{expected} produced an unexpected {actual} result")]
    UnexpectedResult { expected: Action, actual: Action },
}

impl EditorError {
    /// Failure class, shared with the orchestration boundary
    pub fn kind(&self) -> ErrorKind {
        match self {
            EditorError::AI(e) => e.kind(),
            EditorError::EmptyInput(_)
            | EditorError::DocumentNotFound(_)
            | EditorError::NoPendingDiff(_) => ErrorKind::Validation,
            EditorError::UnexpectedResult { .. } => ErrorKind::MalformedResponse,
        }
    }
}

/// Result type for editor session operations
pub type EditorResult<T> = Result<T, EditorError>;
