// Codepilot - shared library
//
// AI request orchestration (prompts, completion transport, response
// interpretation, the code-edit protocol) and client-side editor session
// state. The HTTP surface lives in the codepilot-server crate.

pub mod models;
pub mod services;

// Re-export models for use by the server
pub use models::*;

pub use services::ai::{AIConfig, AIError, AIErrorCode, AIResult, AIService, CompletionClient, ErrorKind};
pub use services::editor::{EditorError, EditorOutcome, EditorSession};
