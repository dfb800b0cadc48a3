//! Structured-section parser
//!
//! Splits an analysis completion into its four labelled sections. Anchors
//! are matched case-insensitively; each section runs from its anchor up to
//! the first later-priority anchor that follows it, or to the end of text.
//! Parsing never fails: an anchor that is absent leaves the placeholder.

use crate::models::RecordSections;

/// Sections in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Summary,
    Methodology,
    Analysis,
    Hypothesis,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Summary,
        Section::Methodology,
        Section::Analysis,
        Section::Hypothesis,
    ];

    /// Lowercase anchor label including the colon
    pub fn anchor(self) -> &'static str {
        match self {
            Section::Summary => "summary:",
            Section::Methodology => "methodology:",
            Section::Analysis => "analysis:",
            Section::Hypothesis => "hypothesis:",
        }
    }

    fn later(self) -> &'static [Section] {
        let position = Section::ALL.iter().position(|s| *s == self).unwrap_or(0);
        &Section::ALL[position + 1..]
    }
}

/// Text following `section`'s first anchor, or `None` when the anchor is absent.
pub fn extract_section(text: &str, section: Section) -> Option<String> {
    // ASCII lowercasing keeps byte offsets aligned with `text`
    let lower = text.to_ascii_lowercase();
    let anchor = section.anchor();
    let start = lower.find(anchor)? + anchor.len();

    let end = section
        .later()
        .iter()
        .filter_map(|next| lower[start..].find(next.anchor()).map(|pos| start + pos))
        .min()
        .unwrap_or(text.len());

    Some(text[start..end].trim().to_string())
}

pub fn parse_sections(text: &str) -> RecordSections {
    let mut sections = RecordSections::default();
    for section in Section::ALL {
        if let Some(body) = extract_section(text, section) {
            match section {
                Section::Summary => sections.summary = body,
                Section::Methodology => sections.methodology = body,
                Section::Analysis => sections.analysis = body,
                Section::Hypothesis => sections.hypothesis = body,
            }
        }
    }
    sections
}
