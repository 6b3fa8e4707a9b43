use crate::error::{AppError, Result};
use crate::llm::{ChatBackend, ChatMessage, ChatRequest};

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";
pub const SUMMARY_INSTRUCTION: &str = "Summarize the following text:";

#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub input_text: String,
    pub model: String,
    pub max_tokens: u32,
}

impl SummaryRequest {
    fn to_chat_request(&self) -> ChatRequest {
        ChatRequest {
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(format!("{}\n\n{}", SUMMARY_INSTRUCTION, self.input_text)),
            ],
            model: self.model.clone(),
            max_tokens: Some(self.max_tokens),
        }
    }
}

/// Turns free text into a short summary with one remote call. No caching, no retry.
pub struct SummarizationClient<'a, B> {
    backend: &'a B,
}

impl<'a, B: ChatBackend> SummarizationClient<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    pub async fn summarize(&self, input_text: &str, model: &str, max_tokens: u32) -> Result<String> {
        self.run(&SummaryRequest {
            input_text: input_text.to_string(),
            model: model.to_string(),
            max_tokens,
        })
        .await
    }

    pub async fn run(&self, request: &SummaryRequest) -> Result<String> {
        tracing::info!(
            model = %request.model,
            input_chars = request.input_text.chars().count(),
            "summarizing text"
        );
        let response = self
            .backend
            .chat(&request.to_chat_request())
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "summarization request failed");
                AppError::SummarizationFailed(e.to_string())
            })?;
        Ok(response.content.trim().to_string())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::llm::{ChatResponse, ChatRole, LlmError};
    use std::sync::Mutex;

    /// Replays canned replies in order and records every request it sees.
    pub(crate) struct StubBackend {
        replies: Mutex<Vec<std::result::Result<String, String>>>,
        pub(crate) requests: Mutex<Vec<ChatRequest>>,
    }

    impl StubBackend {
        pub(crate) fn replying(replies: Vec<std::result::Result<&str, &str>>) -> Self {
            let mut replies: Vec<_> = replies
                .into_iter()
                .map(|r| r.map(str::to_string).map_err(str::to_string))
                .collect();
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn recorded(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl ChatBackend for StubBackend {
        async fn chat(&self, request: &ChatRequest) -> std::result::Result<ChatResponse, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err("no reply queued".to_string()));
            match reply {
                Ok(content) => Ok(ChatResponse {
                    content,
                    model: request.model.clone(),
                }),
                Err(message) => Err(LlmError::Api {
                    status: 503,
                    message,
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_returns_trimmed_summary() {
        let backend = StubBackend::replying(vec![Ok("  A concise summary.\n")]);
        let client = SummarizationClient::new(&backend);
        let summary = client
            .summarize("A very long text about many things.", "llama-3.3-70b-versatile", 150)
            .await
            .unwrap();
        assert_eq!(summary, "A concise summary.");
    }

    #[tokio::test]
    async fn test_prompt_shape() {
        let backend = StubBackend::replying(vec![Ok("ok")]);
        SummarizationClient::new(&backend)
            .summarize("Rust is a systems language.", "some-model", 64)
            .await
            .unwrap();

        let requests = backend.recorded();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.model, "some-model");
        assert_eq!(request.max_tokens, Some(64));
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, ChatRole::System);
        assert_eq!(request.messages[0].content, SYSTEM_PROMPT);
        assert_eq!(request.messages[1].role, ChatRole::User);
        assert_eq!(
            request.messages[1].content,
            "Summarize the following text:\n\nRust is a systems language."
        );
    }

    #[tokio::test]
    async fn test_failure_wraps_backend_message() {
        let backend = StubBackend::replying(vec![Err("rate limited")]);
        let err = SummarizationClient::new(&backend)
            .summarize("text", "m", 150)
            .await
            .unwrap_err();
        match err {
            AppError::SummarizationFailed(msg) => assert!(msg.contains("rate limited")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(backend.recorded().len(), 1);
    }

    #[tokio::test]
    async fn test_identical_inputs_are_not_cached() {
        let backend = StubBackend::replying(vec![Ok("one"), Ok("two")]);
        let client = SummarizationClient::new(&backend);
        assert_eq!(client.summarize("same", "m", 150).await.unwrap(), "one");
        assert_eq!(client.summarize("same", "m", 150).await.unwrap(), "two");
        assert_eq!(backend.recorded().len(), 2);
    }
}
