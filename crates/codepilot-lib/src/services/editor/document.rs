// Document Store
//
// Narrow interface to wherever documents live. The editor only ever reads
// the current content and replaces it wholesale on an approved apply.

use std::collections::HashMap;

pub trait DocumentStore {
    /// Current content of `document_id`, if the document exists
    fn content(&self, document_id: &str) -> Option<String>;

    /// Replace the content of `document_id`, creating it if needed
    fn set_content(&mut self, document_id: &str, content: String);
}

/// HashMap-backed store
#[derive(Debug, Default, Clone)]
pub struct InMemoryDocuments {
    documents: HashMap<String, String>,
}

impl InMemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, document_id: impl Into<String>, content: impl Into<String>) -> Self {
        self.documents.insert(document_id.into(), content.into());
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentStore for InMemoryDocuments {
    fn content(&self, document_id: &str) -> Option<String> {
        self.documents.get(document_id).cloned()
    }

    fn set_content(&mut self, document_id: &str, content: String) {
        self.documents.insert(document_id.to_string(), content);
    }
}
