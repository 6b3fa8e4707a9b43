pub mod cli;
pub mod commands;
pub mod config;
pub mod doc_processor;
pub mod error;
pub mod llm;
pub mod pdf_render;
pub mod session;
pub mod summarizer;

pub use cli::run;
pub use config::Settings;
pub use error::AppError;
pub use llm::{ChatBackend, ChatMessage, ChatRole, Provider};
pub use session::{ChatSession, Transcript};
pub use summarizer::SummarizationClient;
