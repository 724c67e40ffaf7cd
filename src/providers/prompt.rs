//! Prompt construction shared by every backend.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::models::diff::floor_char_boundary;

/// Files listed by name before the rest are summarized.
pub const MAX_PROMPT_FILES: usize = 5;

/// Patch bytes included in a prompt.
pub const MAX_PROMPT_PATCH_BYTES: usize = 2000;

/// More files than this adds the multi-file guidance block.
pub const MULTI_FILE_THRESHOLD: usize = 3;

/// Instruction used when no conventions file is configured or readable.
pub const BUILTIN_CONVENTIONS: &str =
    "Use conventional commit format: type: description (under 50 chars)";

/// Where the active conventions text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConventionsSource {
    Builtin,
    File(PathBuf),
}

impl std::fmt::Display for ConventionsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConventionsSource::Builtin => write!(f, "built-in"),
            ConventionsSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Commit-message conventions given to the model as instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conventions {
    text: String,
    source: ConventionsSource,
}

impl Conventions {
    /// The minimal built-in instruction.
    pub fn builtin() -> Self {
        Self {
            text: BUILTIN_CONVENTIONS.to_string(),
            source: ConventionsSource::Builtin,
        }
    }

    /// Load conventions from `path`, falling back to [`Conventions::builtin`]
    /// when no path is given or the file is unreadable or blank.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::builtin();
        };
        match std::fs::read_to_string(path) {
            Ok(text) if !text.trim().is_empty() => {
                debug!(path = %path.display(), "loaded commit conventions");
                Self {
                    text: text.trim().to_string(),
                    source: ConventionsSource::File(path.to_path_buf()),
                }
            }
            Ok(_) => {
                warn!(path = %path.display(), "conventions file is empty; using built-in conventions");
                Self::builtin()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read conventions file; using built-in conventions");
                Self::builtin()
            }
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> &ConventionsSource {
        &self.source
    }
}

impl Default for Conventions {
    fn default() -> Self {
        Self::builtin()
    }
}

/// The user prompt describing the change set.
pub fn build_prompt(files: &[String], patch: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("Analyze these code changes and generate a professional commit message.\n\n");

    prompt.push_str("Files modified:\n");
    for file in files.iter().take(MAX_PROMPT_FILES) {
        let _ = writeln!(prompt, "- {file}");
    }
    if files.len() > MAX_PROMPT_FILES {
        let _ = writeln!(prompt, "... and {} more files", files.len() - MAX_PROMPT_FILES);
    }

    if files.len() > MULTI_FILE_THRESHOLD {
        prompt.push_str("\nThis is a multi-file change. Focus on the main purpose and scope.\n");
        prompt.push_str("Look for the common theme across all changes.\n");
        prompt.push_str(
            "If changes are mixed (e.g., docs + code + tests), prioritize the most significant functional change.\n\n",
        );
    }

    prompt.push_str("Code changes (git diff):\n");
    prompt.push_str(&excerpt(patch));
    prompt.push('\n');

    prompt.push_str("\nInstructions:\n");
    prompt.push_str("- Use conventional commit format: type(scope): description\n");
    prompt.push_str("- Keep description under 50 characters\n");
    prompt.push_str("- Be specific about what changed, not just file types\n");
    prompt.push_str("- For multi-file changes, describe the main functional change\n");
    prompt.push_str("- Common types: feat, fix, docs, style, refactor, test, chore\n");
    prompt.push_str("- If primarily adding new functionality, use 'feat'\n");
    prompt.push_str("- If primarily fixing issues, use 'fix'\n");
    prompt.push_str("- If mixed changes, choose based on the most significant change\n\n");

    prompt.push_str("Generate only the commit message text. No explanations or formatting.");
    prompt
}

/// A single prompt with the conventions inlined, for completion-style APIs.
pub fn build_inline_prompt(files: &[String], patch: &str, conventions: &Conventions) -> String {
    format!(
        "You are a professional software developer writing commit messages.\n\n\
         Follow these commit message conventions:\n{}\n\n{}",
        conventions.text(),
        build_prompt(files, patch)
    )
}

/// Patch text cut to [`MAX_PROMPT_PATCH_BYTES`], with `...` when cut.
fn excerpt(patch: &str) -> String {
    if patch.len() <= MAX_PROMPT_PATCH_BYTES {
        return patch.to_string();
    }
    let cut = floor_char_boundary(patch, MAX_PROMPT_PATCH_BYTES);
    format!("{}...", &patch[..cut])
}
