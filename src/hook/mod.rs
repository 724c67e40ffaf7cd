//! `prepare-commit-msg` hook management.
//!
//! The installed script asks `commitgen suggest --plain` for a message and
//! writes it into the commit message file, unless the file already has
//! content or git is preparing a merge, squash, or rebase message.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Git hook file name.
pub const HOOK_NAME: &str = "prepare-commit-msg";

/// Line that identifies a hook written by this tool.
pub const HOOK_MARKER: &str = "# managed by commitgen";

/// Errors from hook installation.
#[derive(Error, Debug)]
pub enum HookError {
    #[error("{0} already exists; remove it or pass --force to overwrite")]
    AlreadyExists(PathBuf),

    #[error("{0} was not installed by commitgen; refusing to remove it")]
    Foreign(PathBuf),

    #[error("no prepare-commit-msg hook installed at {0}")]
    NotInstalled(PathBuf),

    #[error("hook I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// What currently sits at the hook path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStatus {
    Missing,
    Installed,
    /// Some other tool's hook.
    Foreign,
}

/// Path of the hook inside `hooks_dir`.
pub fn hook_path(hooks_dir: &Path) -> PathBuf {
    hooks_dir.join(HOOK_NAME)
}

/// Render the hook script for the given binary.
pub fn hook_script(binary: &Path) -> String {
    format!(
        r#"#!/bin/sh
{HOOK_MARKER}
MSG_FILE="$1"
SOURCE="$2"

if [ -s "$MSG_FILE" ]; then
  exit 0
fi

case "$SOURCE" in
  merge|squash|rebase)
    exit 0
    ;;
esac

OUTPUT=$({bin} suggest --plain 2>/dev/null) || exit 0

if [ -z "$OUTPUT" ]; then
  exit 0
fi

printf '%s\n' "$OUTPUT" > "$MSG_FILE"
"#,
        bin = shell_quote(&binary.to_string_lossy())
    )
}

/// Inspect the hook path.
pub fn status(hooks_dir: &Path) -> HookStatus {
    match std::fs::read_to_string(hook_path(hooks_dir)) {
        Ok(content) if content.contains(HOOK_MARKER) => HookStatus::Installed,
        Ok(_) => HookStatus::Foreign,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => HookStatus::Missing,
        // Present but unreadable; treat as someone else's.
        Err(_) => HookStatus::Foreign,
    }
}

/// Write the hook and make it executable. Returns the hook path.
///
/// An existing hook of ours is refreshed; any other hook is only replaced
/// with `force`.
pub fn install(hooks_dir: &Path, binary: &Path, force: bool) -> Result<PathBuf, HookError> {
    let path = hook_path(hooks_dir);
    if status(hooks_dir) == HookStatus::Foreign && !force {
        return Err(HookError::AlreadyExists(path));
    }

    std::fs::create_dir_all(hooks_dir).map_err(|source| HookError::Io {
        path: hooks_dir.to_path_buf(),
        source,
    })?;
    std::fs::write(&path, hook_script(binary)).map_err(|source| HookError::Io {
        path: path.clone(),
        source,
    })?;
    make_executable(&path)?;

    Ok(path)
}

/// Remove a hook previously written by [`install`].
pub fn uninstall(hooks_dir: &Path) -> Result<PathBuf, HookError> {
    let path = hook_path(hooks_dir);
    match status(hooks_dir) {
        HookStatus::Missing => Err(HookError::NotInstalled(path)),
        HookStatus::Foreign => Err(HookError::Foreign(path)),
        HookStatus::Installed => {
            std::fs::remove_file(&path).map_err(|source| HookError::Io {
                path: path.clone(),
                source,
            })?;
            Ok(path)
        }
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), HookError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).map_err(|source| {
        HookError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), HookError> {
    Ok(())
}

/// Single-quote `s` for POSIX sh.
pub(crate) fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
