use crate::config::Settings;
use crate::doc_processor;
use crate::error::{AppError, Result};
use crate::llm::ChatBackend;
use crate::pdf_render;
use crate::summarizer::SummarizationClient;
use serde::Serialize;
use std::path::Path;

pub const MAX_INPUT_CHARS: usize = 2000;
pub const SUMMARY_FILE_NAME: &str = "summary.pdf";
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// A rendered file ready to hand to the user.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryDownload {
    pub file_name: String,
    pub mime_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PdfSummary {
    pub extracted_text: String,
    pub summary: String,
    pub download: SummaryDownload,
}

/// Summarize text typed in by the user.
pub async fn summarize_text<B: ChatBackend>(
    backend: &B,
    settings: &Settings,
    text: &str,
) -> Result<String> {
    if text.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Please enter some text to summarize!".into(),
        ));
    }
    let chars = text.chars().count();
    if chars > MAX_INPUT_CHARS {
        return Err(AppError::InvalidInput(format!(
            "Text is {} characters long; the limit is {}.",
            chars, MAX_INPUT_CHARS
        )));
    }

    SummarizationClient::new(backend)
        .summarize(text, &settings.model, settings.max_tokens)
        .await
}

/// First step of the upload flow: pull the text out so it can be previewed.
pub fn extract_pdf(bytes: &[u8]) -> Result<String> {
    let text = doc_processor::extract_pdf_text(bytes)?;
    tracing::info!(chars = text.chars().count(), "text extracted from PDF");
    Ok(text)
}

/// Extract, summarize and render an uploaded PDF.
pub async fn summarize_pdf<B: ChatBackend>(
    backend: &B,
    settings: &Settings,
    bytes: &[u8],
) -> Result<PdfSummary> {
    let extracted_text = extract_pdf(bytes)?;
    let summary = SummarizationClient::new(backend)
        .summarize(&extracted_text, &settings.model, settings.max_tokens)
        .await?;
    let download = SummaryDownload {
        file_name: SUMMARY_FILE_NAME.to_string(),
        mime_type: PDF_MIME_TYPE.to_string(),
        bytes: pdf_render::render_summary_pdf(&summary)?,
    };

    Ok(PdfSummary {
        extracted_text,
        summary,
        download,
    })
}

/// Load a .txt, .md or .pdf file from disk and summarize its contents.
pub async fn summarize_file<B: ChatBackend>(
    backend: &B,
    settings: &Settings,
    path: &Path,
) -> Result<String> {
    let parsed = doc_processor::parse_file(path)?;
    if parsed.content.trim().is_empty() {
        return Err(AppError::InvalidInput(format!(
            "{} contains no text to summarize.",
            path.display()
        )));
    }
    tracing::info!(file_type = %parsed.file_type, "file loaded");

    SummarizationClient::new(backend)
        .summarize(&parsed.content, &settings.model, settings.max_tokens)
        .await
}
