use crate::constants::prompt;
use std::path::{Path, PathBuf};

/// Builds the final prompt text from a user message plus context files.
///
/// Pure apart from file reads: a file that cannot be read contributes its
/// header with an inline error notice, so one bad path never drops the rest.
pub struct PromptComposer;

impl PromptComposer {
    pub fn compose(message: &str, context_files: &[PathBuf]) -> String {
        if context_files.is_empty() {
            return message.to_string();
        }

        let blocks: Vec<String> = context_files
            .iter()
            .map(|path| Self::file_block(path))
            .collect();

        format!(
            "{}\n{}\n{}",
            blocks.join("\n"),
            prompt::USER_PROMPT_MARKER,
            message
        )
    }

    /// Prompt asking the model for a concise summary of one file.
    pub fn summary_prompt(path: &Path, content: &str) -> String {
        format!(
            "{}\n\n-- FILE: {} --\n{}",
            prompt::SUMMARY_INSTRUCTION,
            path.display(),
            content
        )
    }

    fn file_block(path: &Path) -> String {
        match std::fs::read_to_string(path) {
            Ok(content) => format!("-- FILE: {} --\n{}\n", path.display(), content),
            Err(e) => format!("-- FILE: {} (Error reading: {}) --\n", path.display(), e),
        }
    }
}
