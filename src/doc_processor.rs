use crate::error::{AppError, Result};
use lopdf::Document;
use std::fs;
use std::path::Path;

/// Parsed document content
pub struct ParsedDocument {
    pub content: String,
    pub file_type: String,
}

/// Per-page text of a PDF, in physical page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub pages: Vec<String>,
}

impl ExtractedDocument {
    pub fn text(&self) -> String {
        self.pages.concat()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Extract the concatenated plain text of a PDF held in memory.
///
/// Fails with `NoExtractableText` when the combined text is blank, even if
/// the document itself parsed fine (scanned, image-only PDFs end up here).
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    let text = extract_pdf_pages(bytes)?.text();
    if text.trim().is_empty() {
        return Err(AppError::NoExtractableText);
    }
    Ok(text)
}

pub fn extract_pdf_pages(bytes: &[u8]) -> Result<ExtractedDocument> {
    if bytes.is_empty() {
        return Err(AppError::ExtractionFailed("file is empty".into()));
    }

    let doc = Document::load_mem(bytes).map_err(|e| {
        let msg = e.to_string();
        let lower = msg.to_lowercase();
        if lower.contains("encrypt") || lower.contains("password") {
            AppError::EncryptedDocument
        } else {
            AppError::ExtractionFailed(msg)
        }
    })?;

    extract_from_document(&doc)
}

fn extract_from_document(doc: &Document) -> Result<ExtractedDocument> {
    if doc.is_encrypted() {
        tracing::warn!("refusing to read encrypted PDF");
        return Err(AppError::EncryptedDocument);
    }

    // BTreeMap keyed by page number, so iteration is already in page order.
    let pages = doc.get_pages();
    let mut out = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) => out.push(text),
            Err(e) => {
                tracing::warn!(page = page_number, error = %e, "page yielded no text");
                out.push(String::new());
            }
        }
    }

    tracing::debug!(
        pages = out.len(),
        chars = out.iter().map(|p| p.len()).sum::<usize>(),
        "extracted PDF text"
    );
    Ok(ExtractedDocument { pages: out })
}

/// Parse a document file into plain text
pub fn parse_file(path: &Path) -> Result<ParsedDocument> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let read_err = |e: std::io::Error| {
        AppError::ExtractionFailed(format!("could not read {}: {}", path.display(), e))
    };

    match ext.as_str() {
        "txt" => {
            let content = fs::read_to_string(path).map_err(read_err)?;
            Ok(ParsedDocument {
                content,
                file_type: "txt".into(),
            })
        }
        "md" | "markdown" => {
            let content = fs::read_to_string(path).map_err(read_err)?;
            Ok(ParsedDocument {
                content,
                file_type: "md".into(),
            })
        }
        "pdf" => {
            let bytes = fs::read(path).map_err(read_err)?;
            let content = extract_pdf_text(&bytes)?;
            Ok(ParsedDocument {
                content,
                file_type: "pdf".into(),
            })
        }
        _ => Err(AppError::InvalidInput(format!(
            "Unsupported file type: .{}",
            ext
        ))),
    }
}
