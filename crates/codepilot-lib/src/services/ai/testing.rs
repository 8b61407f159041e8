// Scripted completion provider for orchestration tests

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::{AIError, AIResult, CompletionProvider};
use crate::models::ai::{CompletionRequest, CompletionResponse};

/// Replays queued outcomes in order and records every request it receives
pub struct ScriptedProvider {
    outcomes: Mutex<VecDeque<AIResult<String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(outcomes: Vec<AIResult<String>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn chat_completion(&self, request: &CompletionRequest) -> AIResult<CompletionResponse> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(request.clone());
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AIError::ApiError("no scripted response left".to_string())));
        outcome.map(|content| CompletionResponse {
            content,
            tokens_used: None,
            model: request.model.clone(),
        })
    }
}
