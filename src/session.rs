use crate::error::{AppError, Result};
use crate::llm::{ChatBackend, ChatMessage, ChatRequest, ChatRole};
use crate::summarizer::SYSTEM_PROMPT;
use serde::Serialize;
use uuid::Uuid;

/// Ordered conversation history. Always starts with exactly one system message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system_prompt)],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Number of completed user/assistant exchanges.
    pub fn turns(&self) -> usize {
        (self.messages.len() - 1) / 2
    }

    /// Messages visible in a chat window (everything but the system prompt).
    pub fn visible(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().filter(|m| m.role != ChatRole::System)
    }

    fn with_appended(&self, message: ChatMessage) -> Self {
        let mut messages = Vec::with_capacity(self.messages.len() + 2);
        messages.extend_from_slice(&self.messages);
        messages.push(message);
        Self { messages }
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(SYSTEM_PROMPT)
    }
}

/// Sends `user_message` with the full history and returns the extended
/// transcript plus the assistant's reply. The input transcript is untouched,
/// so a failed turn leaves no unanswered user message behind.
///
/// History is never truncated: each turn re-sends everything, so request
/// size grows linearly with the conversation.
pub async fn extend_transcript<B: ChatBackend>(
    backend: &B,
    model: &str,
    transcript: &Transcript,
    user_message: &str,
) -> Result<(Transcript, ChatMessage)> {
    if user_message.trim().is_empty() {
        return Err(AppError::InvalidInput("Please enter a message to send.".into()));
    }

    let pending = transcript.with_appended(ChatMessage::user(user_message));
    let request = ChatRequest {
        messages: pending.messages.clone(),
        model: model.to_string(),
        max_tokens: None,
    };

    let response = backend.chat(&request).await.map_err(|e| {
        tracing::warn!(error = %e, "chat request failed");
        AppError::ChatFailed(e.to_string())
    })?;

    let reply = ChatMessage::assistant(response.content.trim());
    Ok((pending.with_appended(reply.clone()), reply))
}

/// One user's conversation, owned for the lifetime of the session.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    model: String,
    transcript: Transcript,
}

impl ChatSession {
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_transcript(model, Transcript::default())
    }

    pub fn with_transcript(model: impl Into<String>, transcript: Transcript) -> Self {
        Self {
            id: Uuid::new_v4(),
            model: model.into(),
            transcript,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub async fn extend<B: ChatBackend>(
        &mut self,
        backend: &B,
        user_message: &str,
    ) -> Result<ChatMessage> {
        let (transcript, reply) =
            extend_transcript(backend, &self.model, &self.transcript, user_message).await?;
        self.transcript = transcript;
        tracing::debug!(
            session = %self.id,
            messages = self.transcript.len(),
            "chat turn completed"
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarizer::tests::StubBackend;

    #[tokio::test]
    async fn test_first_turn() {
        let backend = StubBackend::replying(vec![Ok("hello")]);
        let transcript = Transcript::default();

        let (updated, reply) = extend_transcript(&backend, "m", &transcript, "hi")
            .await
            .unwrap();

        assert_eq!(reply, ChatMessage::assistant("hello"));
        assert_eq!(
            updated.messages(),
            &[
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user("hi"),
                ChatMessage::assistant("hello"),
            ]
        );
        assert_eq!(transcript.len(), 1);
    }

    #[tokio::test]
    async fn test_full_history_is_sent_every_turn() {
        let backend = StubBackend::replying(vec![Ok("hello"), Ok(" fine, thanks \n")]);
        let mut session = ChatSession::new("llama-3.3-70b-versatile");

        session.extend(&backend, "hi").await.unwrap();
        let reply = session.extend(&backend, "how are you?").await.unwrap();
        assert_eq!(reply.content, "fine, thanks");
        assert_eq!(session.transcript().len(), 5);
        assert_eq!(session.transcript().turns(), 2);

        let requests = backend.recorded();
        assert_eq!(requests[0].messages.len(), 2);
        assert_eq!(requests[1].messages.len(), 4);
        assert_eq!(requests[1].messages[2], ChatMessage::assistant("hello"));
        assert_eq!(requests[1].model, "llama-3.3-70b-versatile");
    }

    #[tokio::test]
    async fn test_failed_turn_is_rolled_back() {
        let backend = StubBackend::replying(vec![Ok("hello"), Err("upstream timeout")]);
        let mut session = ChatSession::new("m");
        session.extend(&backend, "hi").await.unwrap();
        let before = session.transcript().clone();

        let err = session.extend(&backend, "still there?").await.unwrap_err();
        match err {
            AppError::ChatFailed(msg) => assert!(msg.contains("upstream timeout")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(session.transcript(), &before);
    }

    #[tokio::test]
    async fn test_empty_message_rejected_without_request() {
        let backend = StubBackend::replying(vec![]);
        let mut session = ChatSession::new("m");
        let err = session.extend(&backend, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(backend.recorded().is_empty());
    }

    #[test]
    fn test_visible_hides_system_prompt() {
        let transcript = Transcript::new("Be brief.")
            .with_appended(ChatMessage::user("hi"))
            .with_appended(ChatMessage::assistant("hello"));
        let visible: Vec<_> = transcript.visible().collect();
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].role, ChatRole::User);
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        assert_ne!(ChatSession::new("m").id(), ChatSession::new("m").id());
    }
}
