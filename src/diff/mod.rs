//! Staged change retrieval: a thin wrapper over the git CLI.

pub mod git;

use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::models::ChangeSet;

/// Errors from the diff engine.
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("git command failed: {0}")]
    GitError(String),

    #[error("not a git repository: {0}")]
    NotARepository(String),
}

/// Collect the staged file list and patch for `repo_root`.
///
/// The patch is cut to `max_bytes` on a char boundary. An empty file list
/// means nothing is staged.
pub async fn collect_staged(repo_root: &Path, max_bytes: usize) -> Result<ChangeSet, DiffError> {
    let files = git::staged_files(repo_root).await?;
    if files.is_empty() {
        return Ok(ChangeSet::default());
    }

    let patch = git::staged_patch(repo_root).await?;
    let mut change_set = ChangeSet::new(files, patch);
    change_set.truncate_patch(max_bytes);
    debug!(
        files = change_set.files.len(),
        patch_bytes = change_set.patch.len(),
        truncated = change_set.truncated,
        "collected staged changes"
    );
    Ok(change_set)
}
