// Editor Session Module
//
// Client-side state for one editing session: chat history, staged
// proposals and the narrow document store interface.

pub mod chat_session;
pub mod diff_gate;
pub mod document;
pub mod error;
pub mod session;

pub use chat_session::ChatSession;
pub use diff_gate::DiffGate;
pub use document::{DocumentStore, InMemoryDocuments};
pub use error::{EditorError, EditorResult};
pub use session::{EditorOutcome, EditorSession};
