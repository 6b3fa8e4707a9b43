use crate::error::Result;
use crate::llm::{ChatBackend, ChatMessage};
use crate::session::ChatSession;

/// Send one chat message and return the assistant's reply.
///
/// On failure the session's transcript is left exactly as it was.
pub async fn send_message<B: ChatBackend>(
    backend: &B,
    session: &mut ChatSession,
    content: &str,
) -> Result<ChatMessage> {
    tracing::info!(
        session = %session.id(),
        history = session.transcript().len(),
        "sending chat message"
    );
    session.extend(backend, content).await
}

/// The conversation as a chat window shows it, system prompt excluded.
pub fn get_messages(session: &ChatSession) -> Vec<ChatMessage> {
    session.transcript().visible().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::llm::ChatRole;
    use crate::summarizer::tests::StubBackend;

    #[tokio::test]
    async fn test_send_message_grows_history() {
        let backend = StubBackend::replying(vec![Ok("hello"), Ok("bye")]);
        let mut session = ChatSession::new("m");

        assert_eq!(send_message(&backend, &mut session, "hi").await.unwrap().content, "hello");
        assert_eq!(send_message(&backend, &mut session, "later").await.unwrap().content, "bye");

        let roles: Vec<ChatRole> = get_messages(&session).iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![ChatRole::User, ChatRole::Assistant, ChatRole::User, ChatRole::Assistant]
        );
    }

    #[tokio::test]
    async fn test_send_message_failure() {
        let backend = StubBackend::replying(vec![Err("503")]);
        let mut session = ChatSession::new("m");
        let err = send_message(&backend, &mut session, "hi").await.unwrap_err();
        assert!(matches!(err, AppError::ChatFailed(_)));
        assert!(get_messages(&session).is_empty());
    }
}
