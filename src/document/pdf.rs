// PDF export for generated papers

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

use crate::types::{AppError, AppResult};

/// Running header printed at the top of every page
pub const REPORT_HEADER: &str = "Agentic AI Research Report";

// A4 in points
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const HEADER_BASELINE: f32 = PAGE_HEIGHT - 40.0;
const BODY_TOP: f32 = PAGE_HEIGHT - 80.0;

const BODY_FONT_SIZE: i64 = 10;
const HEADER_FONT_SIZE: i64 = 12;
const LEADING: f32 = 13.0;
// Courier advance width is 600/1000 em
const BODY_CHAR_WIDTH: f32 = 0.6 * BODY_FONT_SIZE as f32;
const HEADER_CHAR_WIDTH: f32 = 0.6 * HEADER_FONT_SIZE as f32;

const SUBSTITUTE: u8 = b'?';

fn chars_per_line() -> usize {
    ((PAGE_WIDTH - 2.0 * MARGIN) / BODY_CHAR_WIDTH) as usize
}

fn lines_per_page() -> usize {
    ((BODY_TOP - MARGIN) / LEADING) as usize + 1
}

/// Map text to single-byte Latin-1, substituting anything outside it.
pub fn to_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u32 as u8,
            _ => SUBSTITUTE,
        })
        .collect()
}

/// Reflow text into lines that fit the body width
fn reflow(text: &str) -> Vec<String> {
    let width = chars_per_line();
    let mut lines = Vec::new();
    for paragraph in text.replace("\r\n", "\n").replace('\t', "    ").split('\n') {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        lines.extend(textwrap::wrap(paragraph, width).into_iter().map(|l| l.into_owned()));
    }
    lines
}

fn page_content(lines: &[String]) -> Content {
    let header_width = REPORT_HEADER.len() as f32 * HEADER_CHAR_WIDTH;
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F2".into(), HEADER_FONT_SIZE.into()]),
        Operation::new(
            "Td",
            vec![((PAGE_WIDTH - header_width) / 2.0).into(), HEADER_BASELINE.into()],
        ),
        Operation::new("Tj", vec![Object::string_literal(to_latin1(REPORT_HEADER))]),
        Operation::new("ET", vec![]),
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), BODY_FONT_SIZE.into()]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new("Td", vec![MARGIN.into(), BODY_TOP.into()]),
    ];
    for line in lines {
        operations.push(Operation::new("Tj", vec![Object::string_literal(to_latin1(line))]));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

/// Render plain text as an A4 PDF. Unsupported characters become `?`.
pub fn render_pdf(text: &str) -> AppResult<Vec<u8>> {
    let lines = reflow(text);
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let body_font = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let header_font = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => body_font,
            "F2" => header_font,
        },
    });

    let chunks: Vec<&[String]> = if lines.is_empty() {
        vec![&lines[..]]
    } else {
        lines.chunks(lines_per_page()).collect()
    };

    let mut page_ids: Vec<ObjectId> = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let encoded = page_content(chunk)
            .encode()
            .map_err(|e| AppError::Export(format!("Failed to encode page: {}", e)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        });
        page_ids.push(page_id);
    }

    let page_count = page_ids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.into_iter().map(Object::from).collect::<Vec<_>>(),
            "Count" => page_count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| AppError::Export(format!("Failed to write PDF: {}", e)))?;
    debug!(pages = page_count, bytes = bytes.len(), "PDF rendered");
    Ok(bytes)
}
