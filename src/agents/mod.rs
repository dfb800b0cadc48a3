//! Agent System
//!
//! One agent per pipeline stage:
//!
//! - **Literature Agent**: fetches candidate records, filters and enriches them
//! - **Researcher Agent**: structured per-record analysis
//! - **Hypothesis Agent**: ranked global hypotheses across records
//! - **Analyst Agent**: synthetic data and the statistical narrative
//! - **Writer Agent**: full paper from everything gathered so far
//! - **Editor Agent**: critique and rewrite of an arbitrary draft
//!
//! ## Pipeline Overview
//!
//! ```text
//!     Topic
//!       │
//!       ▼
//! ┌─────────────┐
//! │ Literature  │  → search, dedup, filter, enrich, cap
//! │   Agent     │
//! └─────────────┘
//!       │
//!       ▼
//! ┌─────────────┐
//! │ Researcher  │  → one completion per record (sequential)
//! │   Agent     │
//! └─────────────┘
//!       │
//!       ▼
//! ┌─────────────┐        ┌─────────────┐
//! │ Hypothesis  │        │  Analyst    │  → dataset → stats → insight
//! │   Agent     │        │   Agent     │
//! └─────────────┘        └─────────────┘
//!       │                       │
//!       └──────────┬────────────┘
//!                  ▼
//!           ┌─────────────┐
//!           │   Writer    │  → paper text → PDF
//!           │   Agent     │
//!           └─────────────┘
//!
//!  Draft ──▶ Editor Agent ──▶ feedback
//! ```
//!
//! Every agent returns a [`StageOutcome`](crate::types::StageOutcome): a
//! failed external call degrades the stage's value to a placeholder or
//! sentinel and never propagates.

pub mod analysis;
pub mod editor;
pub mod file_upload;
pub mod hypothesis;
pub mod literature;
pub mod researcher;
pub mod sections;
pub mod writer;

pub use analysis::AnalystAgent;
pub use editor::{EditorAgent, DEFAULT_INSTRUCTION};
pub use file_upload::{DraftFormat, FileUploadAgent};
pub use hypothesis::HypothesisAgent;
pub use literature::LiteratureAgent;
pub use researcher::{ResearchProgress, ResearcherAgent};
pub use sections::{extract_section, parse_sections, Section};
pub use writer::{PaperDraft, WriterAgent, NO_ANALYSIS_SENTINEL, NO_HYPOTHESES_SENTINEL};
