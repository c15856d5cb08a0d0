//! Conversation state for one model session.
//!
//! A `ChatSession` exists from the moment a model is picked until the user
//! leaves for model selection or exits. It owns the history and performs
//! exchanges through a [`Transport`].

use std::sync::Arc;

use crate::client::Transport;
use crate::error::Result;
use crate::history::History;
use crate::types::{Message, Model, decode_completion};

/// A chat session that manages conversation state and API interactions.
pub struct ChatSession<T: Transport> {
    transport: Arc<T>,
    model: Model,
    history: History,
}

impl<T: Transport> ChatSession<T> {
    /// Creates a session with empty history.
    pub fn new(transport: Arc<T>, model: Model) -> Self {
        Self {
            transport,
            model,
            history: History::new(),
        }
    }

    /// Sends `user_text` with the history as context and records the turn.
    ///
    /// Returns the reply text, or `None` when the response had no choices.
    /// The history is updated only after the response decoded; on any error
    /// it is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns transport errors and [`crate::Error::Decode`] for malformed
    /// responses.
    pub async fn exchange(&mut self, user_text: &str) -> Result<Option<String>> {
        let outbound = self.history.outbound(user_text);
        let body = self.transport.complete(&self.model, outbound).await?;
        let reply = decode_completion(&body)?;
        self.history.record_exchange(user_text, reply.clone());
        Ok(reply)
    }

    /// Clears the conversation history.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Returns the recorded messages.
    pub fn messages(&self) -> &[Message] {
        self.history.messages()
    }

    /// Returns the history.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.history.len()
    }

    /// Returns the model of this session.
    pub fn model(&self) -> &Model {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::types::{ChatMessage, Role};
    use bytes::Bytes;
    use std::sync::Mutex;

    struct CannedTransport {
        body: Result<Bytes>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl CannedTransport {
        fn new(body: Result<Bytes>) -> Arc<Self> {
            Arc::new(Self {
                body,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl Transport for CannedTransport {
        async fn complete(&self, _: &Model, messages: Vec<ChatMessage>) -> Result<Bytes> {
            self.seen.lock().unwrap().push(messages);
            self.body.clone()
        }
    }

    fn reply(text: &str) -> Result<Bytes> {
        Ok(Bytes::from(
            serde_json::json!({"choices": [{"message": {"content": text}}]}).to_string(),
        ))
    }

    #[tokio::test]
    async fn exchange_records_both_turns() {
        let transport = CannedTransport::new(reply("world"));
        let mut session = ChatSession::new(transport.clone(), Model::from("m"));
        let text = session.exchange("hello").await.unwrap();
        assert_eq!(text.as_deref(), Some("world"));
        assert_eq!(
            session.messages(),
            &[Message::user("hello"), Message::assistant("world")]
        );
    }

    #[tokio::test]
    async fn n_exchanges_give_2n_messages() {
        let transport = CannedTransport::new(reply("ok"));
        let mut session = ChatSession::new(transport.clone(), Model::from("m"));
        for i in 0..3 {
            session.exchange(&format!("q{i}")).await.unwrap();
        }
        assert_eq!(session.message_count(), 6);
        let seen = transport.seen.lock().unwrap();
        assert_eq!(
            seen.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![1, 3, 5]
        );
        assert_eq!(seen[2][4].role, Role::User);
        assert_eq!(seen[2][4].text(), "q2");
    }

    #[tokio::test]
    async fn empty_choices_record_user_only() {
        let transport = CannedTransport::new(Ok(Bytes::from_static(br#"{"choices":[]}"#)));
        let mut session = ChatSession::new(transport, Model::from("m"));
        assert_eq!(session.exchange("hello").await.unwrap(), None);
        assert_eq!(session.messages(), &[Message::user("hello")]);
    }

    #[tokio::test]
    async fn failures_leave_history_untouched() {
        let transport = CannedTransport::new(Err(Error::connection("refused", None)));
        let mut session = ChatSession::new(transport, Model::from("m"));
        assert!(session.exchange("hello").await.unwrap_err().is_connection());
        assert_eq!(session.message_count(), 0);

        let transport = CannedTransport::new(Ok(Bytes::from_static(b"not json")));
        let mut session = ChatSession::new(transport, Model::from("m"));
        assert!(session.exchange("hello").await.unwrap_err().is_decode());
        assert_eq!(session.message_count(), 0);
    }

    #[tokio::test]
    async fn clear_starts_fresh_context() {
        let transport = CannedTransport::new(reply("ok"));
        let mut session = ChatSession::new(transport.clone(), Model::from("m"));
        session.exchange("one").await.unwrap();
        session.clear();
        assert_eq!(session.message_count(), 0);
        session.exchange("two").await.unwrap();
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[1], vec![ChatMessage::user("two")]);
    }
}
