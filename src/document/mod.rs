//! Document export and import
//!
//! - `pdf`: paginated PDF rendering of plain text with a Latin-1 fallback
//! - `import`: page-by-page text extraction from uploaded PDFs

pub mod import;
pub mod pdf;

pub use import::{extract_pdf_text, read_pdf};
pub use pdf::{render_pdf, REPORT_HEADER};
