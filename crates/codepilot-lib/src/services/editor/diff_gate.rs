// Diff Gate
//
// One pending proposal per document. Applying a staged proposal is the only
// path by which AI output reaches stored content.

use std::collections::HashMap;

use super::document::DocumentStore;
use super::error::{EditorError, EditorResult};
use crate::models::ai::Action;
use crate::models::editor::{DiffSummary, PendingDiff};

#[derive(Debug, Default, Clone)]
pub struct DiffGate {
    pending: HashMap<String, PendingDiff>,
}

impl DiffGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a proposal, replacing any unresolved one for the same document
    pub fn propose(
        &mut self,
        document_id: &str,
        original: String,
        proposed: String,
        source_action: Action,
    ) -> &PendingDiff {
        let diff = PendingDiff::new(document_id.to_string(), original, proposed, source_action);
        if self.pending.contains_key(document_id) {
            log::info!("[editor] replacing pending {} proposal for {}", source_action, document_id);
        }
        self.pending.insert(document_id.to_string(), diff);
        &self.pending[document_id]
    }

    pub fn pending(&self, document_id: &str) -> Option<&PendingDiff> {
        self.pending.get(document_id)
    }

    pub fn has_pending(&self, document_id: &str) -> bool {
        self.pending.contains_key(document_id)
    }

    pub fn summary(&self, document_id: &str) -> Option<DiffSummary> {
        self.pending(document_id).map(PendingDiff::summary)
    }

    /// Commit the staged content verbatim and clear the slot
    pub fn apply<S: DocumentStore + ?Sized>(
        &mut self,
        document_id: &str,
        store: &mut S,
    ) -> EditorResult<PendingDiff> {
        let diff = self
            .pending
            .remove(document_id)
            .ok_or_else(|| EditorError::NoPendingDiff(document_id.to_string()))?;
        store.set_content(document_id, diff.proposed_content.clone());
        log::info!(
            "[editor] applied {} proposal to {} ({})",
            diff.source_action,
            document_id,
            diff.summary()
        );
        Ok(diff)
    }

    /// Discard the staged proposal; the document is untouched
    pub fn cancel(&mut self, document_id: &str) -> Option<PendingDiff> {
        self.pending.remove(document_id)
    }
}
