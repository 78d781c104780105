//! Push-to-talk conversation turns.
//!
//! A [`ConversationSession`] takes the final transcript of one recording,
//! forwards it to a [`BackendProvider`], and keeps the resulting history.
//! Speech capture and playback happen outside this crate.

use std::sync::Arc;

use chrono::Utc;
use strata_types::{ChatMessage, MessageRole};
use tracing::debug;

use crate::provider::BackendProvider;

pub struct ConversationSession {
    provider: Arc<dyn BackendProvider>,
    messages: Vec<ChatMessage>,
    next_message_id: u64,
}

impl ConversationSession {
    pub fn new(provider: Arc<dyn BackendProvider>) -> Self {
        Self {
            provider,
            messages: Vec::new(),
            next_message_id: 1,
        }
    }

    /// Submit the transcript of one push-to-talk recording.
    ///
    /// Blank transcripts are dropped without contacting the backend and yield
    /// `None`. Otherwise the user message and the assistant reply are appended
    /// to the history and the reply is returned.
    pub async fn submit_transcript(&mut self, transcript: &str) -> Option<ChatMessage> {
        if transcript.trim().is_empty() {
            debug!("ignoring empty transcript");
            return None;
        }

        self.push(MessageRole::User, transcript.to_string());
        let reply = self.provider.send_message(transcript).await;
        debug!(provider = self.provider.name(), reply_len = reply.len(), "received reply");
        Some(self.push(MessageRole::Assistant, reply))
    }

    /// History in submission order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Most recent assistant reply, if any.
    pub fn last_reply(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == MessageRole::Assistant)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn push(&mut self, role: MessageRole, text: String) -> ChatMessage {
        let message = ChatMessage {
            id: format!("{role}-{}", self.next_message_id),
            role,
            text,
            created_at: Utc::now(),
        };
        self.next_message_id += 1;
        self.messages.push(message.clone());
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use strata_types::{ClientConfig, ConnectionReport};

    #[derive(Default)]
    struct EchoProvider {
        received: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BackendProvider for EchoProvider {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn configure(&self, _config: ClientConfig) {}

        async fn send_message(&self, text: &str) -> String {
            self.received.lock().unwrap().push(text.to_string());
            format!("echo: {text}")
        }

        async fn test_connection(&self) -> ConnectionReport {
            ConnectionReport::success("ok")
        }
    }

    #[tokio::test]
    async fn transcript_produces_user_and_assistant_messages() {
        let provider = Arc::new(EchoProvider::default());
        let mut session = ConversationSession::new(provider.clone());

        let reply = session.submit_transcript("turn on the lights").await.unwrap();
        assert_eq!(reply.role, MessageRole::Assistant);
        assert_eq!(reply.text, "echo: turn on the lights");

        let roles: Vec<_> = session.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, [MessageRole::User, MessageRole::Assistant]);
        assert_eq!(*provider.received.lock().unwrap(), ["turn on the lights"]);
    }

    #[tokio::test]
    async fn blank_transcript_never_reaches_backend() {
        let provider = Arc::new(EchoProvider::default());
        let mut session = ConversationSession::new(provider.clone());

        assert!(session.submit_transcript("   \n").await.is_none());
        assert!(session.messages().is_empty());
        assert!(provider.received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn message_ids_are_unique_and_ordered() {
        let mut session = ConversationSession::new(Arc::new(EchoProvider::default()));
        session.submit_transcript("one").await;
        session.submit_transcript("two").await;

        let ids: Vec<_> = session.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["user-1", "assistant-2", "user-3", "assistant-4"]);
        assert_eq!(session.last_reply().map(|m| m.text.as_str()), Some("echo: two"));

        session.clear();
        assert!(session.messages().is_empty());
        assert!(session.last_reply().is_none());
    }
}
