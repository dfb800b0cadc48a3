// Scholar Bot - multi-agent research pipeline from topic to paper

pub mod agents;
pub mod analysis;
pub mod config;
pub mod document;
pub mod llm;
pub mod models;
pub mod search;   // arXiv search and OpenAlex metadata
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use config::Config;
pub use session::{Pipeline, SessionState};
pub use types::{AppError, AppResult, StageOutcome};
