// Chat Session
//
// Ordered user/assistant history resent in full on every turn. The current
// document is injected into the system prompt per turn and never stored as
// a message.

use uuid::Uuid;

use crate::models::ai::ChatMessage;
use crate::services::ai::{AIResult, AIService};

#[derive(Debug, Clone)]
pub struct ChatSession {
    id: String,
    history: Vec<ChatMessage>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// History followed by the new user turn, without the system message
    pub fn outbound(&self, message: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.history.len() + 1);
        messages.extend(self.history.iter().cloned());
        messages.push(ChatMessage::user(message));
        messages
    }

    /// Run one chat turn
    ///
    /// The exchange is recorded only when the completion succeeds; a failed
    /// turn leaves the history untouched.
    pub async fn send(
        &mut self,
        service: &AIService,
        message: &str,
        current_code: Option<&str>,
        model: Option<&str>,
    ) -> AIResult<String> {
        let outbound = self.outbound(message);
        let reply = service
            .chat_with_history(&outbound, current_code, model)
            .await?
            .message;

        self.history.push(ChatMessage::user(message));
        self.history.push(ChatMessage::assistant(reply.clone()));
        log::debug!("[editor] chat {} now has {} messages", self.id, self.history.len());
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::models::ai::MessageRole;
    use crate::services::ai::testing::ScriptedProvider;
    use crate::services::ai::{AIConfig, AIError, CompletionClient};

    fn service_with(outcomes: Vec<AIResult<String>>) -> (AIService, Arc<ScriptedProvider>) {
        let provider = Arc::new(ScriptedProvider::new(outcomes));
        let config = AIConfig::default();
        let client = Arc::new(CompletionClient::with_provider(provider.clone(), &config));
        (AIService::with_client(config, client), provider)
    }

    #[tokio::test]
    async fn test_outbound_grows_by_two_per_turn() {
        let (service, provider) = service_with(vec![
            Ok("one".to_string()),
            Ok("two".to_string()),
            Ok("three".to_string()),
        ]);
        let mut session = ChatSession::new();

        for (turn, message) in ["a", "b", "c"].into_iter().enumerate() {
            session.send(&service, message, Some("code"), None).await.unwrap();
            let requests = provider.requests();
            // system + 2N prior messages + the new user message
            assert_eq!(requests[turn].messages.len(), 1 + 2 * turn + 1);
            assert_eq!(requests[turn].messages[0].role, MessageRole::System);
        }

        assert_eq!(session.len(), 6);
        assert_eq!(session.history()[4], ChatMessage::user("c"));
        assert_eq!(session.history()[5], ChatMessage::assistant("three"));
    }

    #[tokio::test]
    async fn test_failed_turn_leaves_history_unchanged() {
        let (service, _) = service_with(vec![
            Ok("first".to_string()),
            Err(AIError::Timeout),
        ]);
        let mut session = ChatSession::new();
        session.send(&service, "hello", None, None).await.unwrap();

        let before = session.history().to_vec();
        let result = session.send(&service, "again", None, None).await;
        assert!(matches!(result, Err(AIError::Timeout)));
        assert_eq!(session.history(), before.as_slice());
    }

    #[tokio::test]
    async fn test_document_is_not_stored_in_history() {
        let (service, provider) = service_with(vec![Ok("ok".to_string()), Ok("ok".to_string())]);
        let mut session = ChatSession::new();
        session.send(&service, "q1", Some("version one"), None).await.unwrap();
        session.send(&service, "q2", Some("version two"), None).await.unwrap();

        let requests = provider.requests();
        assert!(requests[1].messages[0].content.contains("version two"));
        assert!(!requests[1].messages[0].content.contains("version one"));
        assert!(session.history().iter().all(|m| !m.content.contains("version")));
    }

    #[test]
    fn test_clear() {
        let mut session = ChatSession::new();
        assert_eq!(session.outbound("hi"), vec![ChatMessage::user("hi")]);
        session.history.push(ChatMessage::user("x"));
        session.clear();
        assert!(session.is_empty());
    }
}
