//! Editor Agent
//!
//! Critiques and rewrites an arbitrary draft following a free-text
//! instruction.

use tracing::{info, warn};

use crate::llm::LLM;
use crate::types::StageOutcome;

pub const DEFAULT_INSTRUCTION: &str = "Improve flow and academic tone";
pub const EMPTY_DRAFT_MESSAGE: &str = "Please provide some text to edit.";

pub struct EditorAgent;

impl EditorAgent {
    pub fn create_edit_prompt(draft: &str, instruction: &str) -> String {
        format!(
            r#"Act as a Senior Academic Editor.
User Instruction: "{}"

Draft Content:
{}

Task:
1. Critique: Briefly list 3 strengths and 3 weaknesses.
2. Improvements: Provide a list of specific actionable changes.
3. Rewrite: Rewrite the draft applying these improvements.

Output in Markdown. Use bold headers."#,
            instruction, draft
        )
    }

    /// Returns the editor feedback, or an inline error string.
    pub async fn edit(llm: &LLM, draft: &str, instruction: &str) -> StageOutcome<String> {
        if draft.trim().is_empty() {
            return StageOutcome::degraded(EMPTY_DRAFT_MESSAGE.to_string(), "draft is empty");
        }
        let instruction = match instruction.trim() {
            "" => DEFAULT_INSTRUCTION,
            given => given,
        };

        info!(draft_len = draft.len(), instruction = %instruction, "Editing draft");
        match llm.complete(&Self::create_edit_prompt(draft, instruction), None).await {
            Ok(feedback) => StageOutcome::Ok(feedback),
            Err(e) => {
                warn!(error = %e, "Editing failed");
                StageOutcome::degraded(format!("Editing Error: {}", e), e.to_string())
            }
        }
    }
}
