use serde::{Serialize, Serializer};

/// Every failure a workflow can hand back to the shell.
///
/// Each variant carries the message of the cause it was raised from.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("The uploaded PDF is encrypted and cannot be processed")]
    EncryptedDocument,
    #[error("No extractable text found in the PDF")]
    NoExtractableText,
    #[error("Failed to extract text from PDF: {0}")]
    ExtractionFailed(String),
    #[error("Failed to save summary to PDF: {0}")]
    RenderFailed(String),
    #[error("Summarization failed: {0}")]
    SummarizationFailed(String),
    #[error("Chat request failed: {0}")]
    ChatFailed(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    /// Short machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::EncryptedDocument => "encrypted_document",
            AppError::NoExtractableText => "no_extractable_text",
            AppError::ExtractionFailed(_) => "extraction_failed",
            AppError::RenderFailed(_) => "render_failed",
            AppError::SummarizationFailed(_) => "summarization_failed",
            AppError::ChatFailed(_) => "chat_failed",
            AppError::Configuration(_) => "configuration",
            AppError::InvalidInput(_) => "invalid_input",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            other => format!("An error occurred: {}", other),
        }
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_carries_cause() {
        let err = AppError::SummarizationFailed("HTTP error: connection refused".into());
        assert_eq!(
            err.to_string(),
            "Summarization failed: HTTP error: connection refused"
        );
        assert_eq!(err.kind(), "summarization_failed");
    }

    #[test]
    fn test_error_serializes_as_string() {
        let json = serde_json::to_string(&AppError::EncryptedDocument).unwrap();
        assert_eq!(
            json,
            "\"The uploaded PDF is encrypted and cannot be processed\""
        );
    }

    #[test]
    fn test_invalid_input_message_is_shown_verbatim() {
        let err = AppError::InvalidInput("Please enter some text to summarize!".into());
        assert_eq!(err.user_message(), "Please enter some text to summarize!");
        assert_eq!(
            AppError::NoExtractableText.user_message(),
            "An error occurred: No extractable text found in the PDF"
        );
    }
}
