//! Git CLI wrapper for reading staged changes.
//!
//! Shells out to `git` via `tokio::process::Command`.

use std::path::{Path, PathBuf};

use super::DiffError;

/// Run `git <args>` in `repo_root` and return stdout.
async fn run_git(repo_root: &Path, args: &[&str]) -> Result<Vec<u8>, DiffError> {
    let output = tokio::process::Command::new("git")
        .args(args)
        .current_dir(repo_root)
        .output()
        .await
        .map_err(|e| DiffError::GitError(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("not a git repository") {
            return Err(DiffError::NotARepository(stderr.trim().to_string()));
        }
        return Err(DiffError::GitError(format!(
            "git {} failed (exit {}): {}",
            args.first().copied().unwrap_or_default(),
            output.status,
            stderr.trim()
        )));
    }

    Ok(output.stdout)
}

/// Run `git diff --cached --name-only`, in the order git reports.
pub async fn staged_files(repo_root: &Path) -> Result<Vec<String>, DiffError> {
    let stdout = run_git(repo_root, &["diff", "--cached", "--name-only"]).await?;
    let text = String::from_utf8(stdout)
        .map_err(|e| DiffError::GitError(format!("git output is not valid UTF-8: {e}")))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

/// Run `git diff --cached` and return the unified patch.
///
/// Non-UTF-8 content is replaced rather than rejected; the patch is only
/// ever read by keyword matching and the model.
pub async fn staged_patch(repo_root: &Path) -> Result<String, DiffError> {
    let stdout = run_git(
        repo_root,
        &["diff", "--cached", "--find-renames", "--src-prefix=a/", "--dst-prefix=b/"],
    )
    .await?;
    Ok(String::from_utf8_lossy(&stdout).into_owned())
}

/// Find the root of the git repository containing `start_dir`.
pub async fn find_repo_root(start_dir: &Path) -> Result<PathBuf, DiffError> {
    let stdout = run_git(start_dir, &["rev-parse", "--show-toplevel"])
        .await
        .map_err(|e| match e {
            DiffError::GitError(msg) => DiffError::NotARepository(msg),
            other => other,
        })?;
    Ok(PathBuf::from(String::from_utf8_lossy(&stdout).trim()))
}

/// Resolve the hooks directory, honouring `core.hooksPath` and worktrees.
pub async fn hooks_dir(repo_root: &Path) -> Result<PathBuf, DiffError> {
    let stdout = run_git(repo_root, &["rev-parse", "--git-path", "hooks"]).await?;
    let path = PathBuf::from(String::from_utf8_lossy(&stdout).trim());
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(repo_root.join(path))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{git, init_repo};
    use super::*;

    #[tokio::test]
    async fn find_repo_root_non_git() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_repo_root(dir.path()).await.unwrap_err();
        assert!(matches!(err, DiffError::NotARepository(_)), "got: {err}");
        assert!(err.to_string().contains("not a git repository"));
    }

    #[tokio::test]
    async fn find_repo_root_from_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path()).await;
        let nested = dir.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        let root = find_repo_root(&nested).await.unwrap();
        assert_eq!(
            root.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[tokio::test]
    async fn staged_files_and_patch() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path();
        init_repo(p).await;
        tokio::fs::write(p.join("notes.md"), "hello\nworld\n").await.unwrap();
        tokio::fs::write(p.join("unstaged.rs"), "fn x() {}\n").await.unwrap();
        git(p, &["add", "notes.md"]).await;

        assert_eq!(staged_files(p).await.unwrap(), vec!["notes.md"]);
        let patch = staged_patch(p).await.unwrap();
        assert!(patch.contains("+world"), "patch: {patch}");
        assert!(!patch.contains("unstaged.rs"));
    }

    #[tokio::test]
    async fn staged_rename_has_rename_markers() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path();
        init_repo(p).await;
        tokio::fs::write(p.join("old.rs"), "fn keep() {}\n").await.unwrap();
        git(p, &["add", "."]).await;
        git(p, &["commit", "-q", "-m", "add"]).await;
        git(p, &["mv", "old.rs", "new.rs"]).await;

        let patch = staged_patch(p).await.unwrap();
        assert!(patch.contains("rename from old.rs"), "patch: {patch}");
        assert!(patch.contains("rename to new.rs"));
        assert!(!patch.contains("@@"));
    }

    #[tokio::test]
    async fn hooks_dir_is_absolute() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path()).await;
        let hooks = hooks_dir(dir.path()).await.unwrap();
        assert!(hooks.is_absolute());
        assert!(hooks.ends_with("hooks"));
    }
}
