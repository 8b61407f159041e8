// Editor session data models
//
// Value objects owned by one editing session: staged AI proposals and
// their review summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

use super::ai::Action;

/// A proposed document mutation awaiting explicit user approval
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingDiff {
    /// Document the proposal targets
    pub target_document_id: String,
    /// Document content at the time the action was run
    pub original_content: String,
    /// Content that replaces the document on apply
    pub proposed_content: String,
    /// Action that produced the proposal
    pub source_action: Action,
    /// When the proposal was staged
    pub created_at: DateTime<Utc>,
}

impl PendingDiff {
    pub fn new(
        target_document_id: String,
        original_content: String,
        proposed_content: String,
        source_action: Action,
    ) -> Self {
        Self {
            target_document_id,
            original_content,
            proposed_content,
            source_action,
            created_at: Utc::now(),
        }
    }

    /// Line-level change statistics for review
    pub fn summary(&self) -> DiffSummary {
        let diff = TextDiff::from_lines(&self.original_content, &self.proposed_content);
        let mut summary = DiffSummary::default();
        for change in diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert => summary.lines_added += 1,
                ChangeTag::Delete => summary.lines_removed += 1,
                ChangeTag::Equal => summary.lines_unchanged += 1,
            }
        }
        summary
    }
}

/// Line-level statistics of a staged proposal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    pub lines_added: usize,
    pub lines_removed: usize,
    pub lines_unchanged: usize,
}

impl DiffSummary {
    pub fn has_changes(&self) -> bool {
        self.lines_added > 0 || self.lines_removed > 0
    }
}

impl std::fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "+{} -{}", self.lines_added, self.lines_removed)
    }
}

/// A single-turn action run against the whole document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeAction {
    Explain,
    FindBugs,
    Refactor,
    Optimize,
    Convert { target_language: String },
}

impl CodeAction {
    pub fn action(&self) -> Action {
        match self {
            CodeAction::Explain => Action::Explain,
            CodeAction::FindBugs => Action::FindBugs,
            CodeAction::Refactor => Action::Refactor,
            CodeAction::Optimize => Action::Optimize,
            CodeAction::Convert { .. } => Action::Convert,
        }
    }

    pub fn target_language(&self) -> Option<&str> {
        match self {
            CodeAction::Convert { target_language } => Some(target_language),
            _ => None,
        }
    }
}
