// Text extraction from uploaded PDF drafts

use lopdf::Document;
use tracing::warn;

use crate::types::{AppError, AppResult};

/// Extract the text of every page, in page order.
pub fn extract_pdf_text(bytes: &[u8]) -> AppResult<String> {
    let doc = Document::load_mem(bytes).map_err(|e| AppError::Import(e.to_string()))?;
    let mut text = String::new();
    for page_number in doc.get_pages().keys() {
        let page_text = doc
            .extract_text(&[*page_number])
            .map_err(|e| AppError::Import(format!("page {}: {}", page_number, e)))?;
        text.push_str(&page_text);
    }
    Ok(text)
}

/// Like [`extract_pdf_text`], but failures come back as an inline
/// `Error reading PDF: ...` string.
pub fn read_pdf(bytes: &[u8]) -> String {
    match extract_pdf_text(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "PDF extraction failed");
            let reason = match e {
                AppError::Import(reason) => reason,
                other => other.to_string(),
            };
            format!("Error reading PDF: {}", reason)
        }
    }
}
