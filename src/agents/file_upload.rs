//! Draft import for the editor stage
//!
//! Plain-text drafts pass through verbatim; PDF drafts go through page
//! extraction, whose failures are returned inline as text.

use std::path::Path;

use tracing::info;

use crate::document::read_pdf;
use crate::types::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftFormat {
    Pdf,
    PlainText,
}

impl DraftFormat {
    /// Format by file extension; only pdf, txt and md are accepted
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())?;
        match extension.as_str() {
            "pdf" => Some(DraftFormat::Pdf),
            "txt" | "md" => Some(DraftFormat::PlainText),
            _ => None,
        }
    }
}

pub struct FileUploadAgent;

impl FileUploadAgent {
    pub fn extract_draft(filename: &str, content: &[u8]) -> AppResult<String> {
        let format = DraftFormat::from_filename(filename).ok_or_else(|| {
            AppError::Import(format!("Unsupported draft type: {} (expected pdf, txt or md)", filename))
        })?;

        let text = match format {
            DraftFormat::Pdf => read_pdf(content),
            DraftFormat::PlainText => String::from_utf8_lossy(content).into_owned(),
        };
        info!(filename = %filename, format = ?format, chars = text.len(), "Draft imported");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::render_pdf;

    #[test]
    fn test_format_detection() {
        assert_eq!(DraftFormat::from_filename("paper.PDF"), Some(DraftFormat::Pdf));
        assert_eq!(DraftFormat::from_filename("notes.md"), Some(DraftFormat::PlainText));
        assert_eq!(DraftFormat::from_filename("draft.txt"), Some(DraftFormat::PlainText));
        assert_eq!(DraftFormat::from_filename("sheet.xlsx"), None);
        assert_eq!(DraftFormat::from_filename("README"), None);
    }

    #[test]
    fn test_plain_text_is_verbatim() {
        let text = FileUploadAgent::extract_draft("draft.md", "# Intro\n\nDraft body".as_bytes()).unwrap();
        assert_eq!(text, "# Intro\n\nDraft body");
    }

    #[test]
    fn test_pdf_is_extracted() {
        let bytes = render_pdf("Methods section text").unwrap();
        let text = FileUploadAgent::extract_draft("draft.pdf", &bytes).unwrap();
        assert!(text.contains("Methods section text"));
    }

    #[test]
    fn test_broken_pdf_is_inline_error() {
        let text = FileUploadAgent::extract_draft("draft.pdf", b"%PDF-garbage").unwrap();
        assert!(text.starts_with("Error reading PDF:"));
    }

    #[test]
    fn test_unsupported_type_is_rejected() {
        let err = FileUploadAgent::extract_draft("data.csv", b"a,b").unwrap_err();
        assert!(matches!(err, AppError::Import(_)));
    }
}
