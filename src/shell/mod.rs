//! zsh integration.
//!
//! `install` writes a snippet that previews the suggested message as ghost
//! text after `git commit -m "` and adds a guarded block to `~/.zshrc` that
//! sources it. `uninstall` removes both. Lines outside the guarded block are
//! never touched.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::hook::shell_quote;

/// Snippet location relative to the home directory.
pub const SNIPPET_REL_PATH: &str = ".config/commitgen.zsh";

/// First line of the block added to `.zshrc`.
pub const GUARD_START: &str = "# >>> commitgen >>> (managed)";

/// Last line of the block added to `.zshrc`.
pub const GUARD_END: &str = "# <<< commitgen <<<";

/// First line of a snippet written by this tool.
pub const SNIPPET_HEADER: &str = "# commitgen zsh integration (managed)";

const BIN_PLACEHOLDER: &str = "@COMMITGEN_BIN@";

const SNIPPET_TEMPLATE: &str = r#"# commitgen zsh integration (managed)
# Shows the suggested message after `git commit -m "` or `gc "`.
# Ctrl-F or Right arrow accepts it.

typeset -g _commitgen_bin=""
typeset -g _commitgen_suggestion=""
typeset -gi _commitgen_fetched=0

_commitgen_locate() {
  if [[ -n ${COMMITGEN_BIN-} && -x ${COMMITGEN_BIN} ]]; then
    _commitgen_bin=$COMMITGEN_BIN
  elif [[ -z $_commitgen_bin ]]; then
    _commitgen_bin=$(command -v commitgen 2>/dev/null) || _commitgen_bin=@COMMITGEN_BIN@
  fi
  [[ -x $_commitgen_bin ]]
}

_commitgen_fetch() {
  _commitgen_locate || return 1
  _commitgen_suggestion=$("$_commitgen_bin" cache latest --plain 2>/dev/null)
  if [[ -z $_commitgen_suggestion ]]; then
    _commitgen_suggestion=$("$_commitgen_bin" suggest --plain 2>/dev/null)
  fi
  [[ -n $_commitgen_suggestion ]]
}

_commitgen_preview() {
  local prefix
  case $LBUFFER in
    'git commit -m "'*) prefix='git commit -m "' ;;
    'gc "'*) prefix='gc "' ;;
    *) POSTDISPLAY=; return ;;
  esac

  local typed=${LBUFFER#$prefix}
  if [[ $typed == *'"'* || -n $RBUFFER ]]; then
    POSTDISPLAY=
    return
  fi

  if (( ! _commitgen_fetched )); then
    _commitgen_fetched=1
    _commitgen_fetch
  fi

  if [[ -n $_commitgen_suggestion && $_commitgen_suggestion == $typed* && $_commitgen_suggestion != $typed ]]; then
    POSTDISPLAY="${_commitgen_suggestion#$typed}\""
  else
    POSTDISPLAY=
  fi
}

_commitgen_accept() {
  if [[ -n $POSTDISPLAY ]]; then
    LBUFFER+=$POSTDISPLAY
    POSTDISPLAY=
  else
    zle forward-char
  fi
}

_commitgen_reset() {
  _commitgen_fetched=0
  _commitgen_suggestion=""
  POSTDISPLAY=
}

if (( ! ${+_commitgen_loaded} )); then
  typeset -g _commitgen_loaded=1
  autoload -Uz add-zle-hook-widget
  zle -N _commitgen_preview
  zle -N _commitgen_reset
  add-zle-hook-widget line-pre-redraw _commitgen_preview
  add-zle-hook-widget line-finish _commitgen_reset
  zle -N commitgen-accept _commitgen_accept
  bindkey '^F' commitgen-accept
  bindkey '^[[C' commitgen-accept
fi
"#;

/// Errors from shell integration management.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("home directory could not be determined")]
    NoHome,

    #[error("shell integration I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Files touched by the integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellPaths {
    pub snippet: PathBuf,
    pub zshrc: PathBuf,
}

impl ShellPaths {
    pub fn in_home(home: &Path) -> Self {
        Self {
            snippet: home.join(SNIPPET_REL_PATH),
            zshrc: home.join(".zshrc"),
        }
    }

    /// Paths under the current user's home directory.
    pub fn detect() -> Result<Self, ShellError> {
        dirs::home_dir()
            .map(|home| Self::in_home(&home))
            .ok_or(ShellError::NoHome)
    }
}

/// What is currently installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellStatus {
    pub snippet_installed: bool,
    pub block_present: bool,
}

/// What an install or uninstall changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellChange {
    pub snippet: bool,
    pub block: bool,
}

/// Render the zsh snippet. `binary` is used when `commitgen` is not on `PATH`.
pub fn snippet(binary: &Path) -> String {
    SNIPPET_TEMPLATE.replace(BIN_PLACEHOLDER, &shell_quote(&binary.to_string_lossy()))
}

/// The `.zshrc` block that sources `snippet_path`.
pub fn guarded_block(snippet_path: &Path) -> String {
    let quoted = shell_quote(&snippet_path.to_string_lossy());
    format!("{GUARD_START}\n[[ -f {quoted} ]] && source {quoted}\n{GUARD_END}\n")
}

pub fn status(paths: &ShellPaths) -> ShellStatus {
    let snippet_installed = std::fs::read_to_string(&paths.snippet)
        .is_ok_and(|content| content.starts_with(SNIPPET_HEADER));
    let block_present = std::fs::read_to_string(&paths.zshrc)
        .is_ok_and(|content| has_guarded_block(&content));
    ShellStatus {
        snippet_installed,
        block_present,
    }
}

/// Write the snippet and, if missing, the `.zshrc` block.
///
/// The snippet is always rewritten so a reinstall picks up a new binary
/// path. `block` reports whether `.zshrc` was changed.
pub fn install(paths: &ShellPaths, binary: &Path) -> Result<ShellChange, ShellError> {
    if let Some(dir) = paths.snippet.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ShellError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    write(&paths.snippet, &snippet(binary))?;

    let mut zshrc = read_optional(&paths.zshrc)?;
    if has_guarded_block(&zshrc) {
        return Ok(ShellChange {
            snippet: true,
            block: false,
        });
    }
    if !zshrc.is_empty() && !zshrc.ends_with('\n') {
        zshrc.push('\n');
    }
    zshrc.push_str(&guarded_block(&paths.snippet));
    write(&paths.zshrc, &zshrc)?;

    Ok(ShellChange {
        snippet: true,
        block: true,
    })
}

/// Remove the `.zshrc` block and the snippet. Missing pieces are skipped.
pub fn uninstall(paths: &ShellPaths) -> Result<ShellChange, ShellError> {
    let zshrc = read_optional(&paths.zshrc)?;
    let block = match remove_guarded_block(&zshrc) {
        Some(rest) => {
            write(&paths.zshrc, &rest)?;
            true
        }
        None => false,
    };

    let snippet = match std::fs::remove_file(&paths.snippet) {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(source) => {
            return Err(ShellError::Io {
                path: paths.snippet.clone(),
                source,
            });
        }
    };

    Ok(ShellChange { snippet, block })
}

fn has_guarded_block(text: &str) -> bool {
    text.find(GUARD_START)
        .is_some_and(|start| text[start..].contains(GUARD_END))
}

/// `text` without the first guarded block and its trailing newline, or
/// `None` when there is no complete block.
fn remove_guarded_block(text: &str) -> Option<String> {
    let start = text.find(GUARD_START)?;
    let mut end = start + text[start..].find(GUARD_END)? + GUARD_END.len();
    if text[end..].starts_with('\n') {
        end += 1;
    }
    Some(format!("{}{}", &text[..start], &text[end..]))
}

fn read_optional(path: &Path) -> Result<String, ShellError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(source) => Err(ShellError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write(path: &Path, content: &str) -> Result<(), ShellError> {
    std::fs::write(path, content).map_err(|source| ShellError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home() -> (tempfile::TempDir, ShellPaths) {
        let dir = tempfile::tempdir().unwrap();
        let paths = ShellPaths::in_home(dir.path());
        (dir, paths)
    }

    #[test]
    fn snippet_asks_cache_then_suggest() {
        let text = snippet(Path::new("/opt/bin/commitgen"));
        assert!(text.starts_with(SNIPPET_HEADER));
        assert!(text.contains("cache latest --plain"));
        assert!(text.contains("suggest --plain"));
        assert!(text.contains("_commitgen_bin='/opt/bin/commitgen'"));
        assert!(!text.contains(BIN_PLACEHOLDER));
    }

    #[test]
    fn block_sources_quoted_snippet() {
        let block = guarded_block(Path::new("/home/u/.config/commitgen.zsh"));
        assert_eq!(
            block,
            "# >>> commitgen >>> (managed)\n\
             [[ -f '/home/u/.config/commitgen.zsh' ]] && source '/home/u/.config/commitgen.zsh'\n\
             # <<< commitgen <<<\n"
        );
    }

    #[test]
    fn install_creates_snippet_and_zshrc() {
        let (_dir, paths) = home();
        assert_eq!(
            status(&paths),
            ShellStatus {
                snippet_installed: false,
                block_present: false
            }
        );

        let change = install(&paths, Path::new("commitgen")).unwrap();
        assert!(change.snippet && change.block);
        assert_eq!(
            status(&paths),
            ShellStatus {
                snippet_installed: true,
                block_present: true
            }
        );
        let zshrc = std::fs::read_to_string(&paths.zshrc).unwrap();
        assert_eq!(zshrc, guarded_block(&paths.snippet));
    }

    #[test]
    fn install_is_idempotent() {
        let (_dir, paths) = home();
        std::fs::write(&paths.zshrc, "export EDITOR=vim").unwrap();

        install(&paths, Path::new("a")).unwrap();
        let change = install(&paths, Path::new("b")).unwrap();
        assert!(!change.block);

        let zshrc = std::fs::read_to_string(&paths.zshrc).unwrap();
        assert_eq!(zshrc.matches(GUARD_START).count(), 1);
        assert!(zshrc.starts_with("export EDITOR=vim\n# >>> commitgen"));
        let snippet = std::fs::read_to_string(&paths.snippet).unwrap();
        assert!(snippet.contains("_commitgen_bin='b'"));
    }

    #[test]
    fn uninstall_restores_zshrc() {
        let (_dir, paths) = home();
        let original = "export EDITOR=vim\nalias gs='git status'\n";
        std::fs::write(&paths.zshrc, original).unwrap();

        install(&paths, Path::new("commitgen")).unwrap();
        std::fs::OpenOptions::new()
            .append(true)
            .open(&paths.zshrc)
            .and_then(|mut f| std::io::Write::write_all(&mut f, b"export LATER=1\n"))
            .unwrap();

        let change = uninstall(&paths).unwrap();
        assert!(change.snippet && change.block);
        assert!(!paths.snippet.exists());
        assert_eq!(
            std::fs::read_to_string(&paths.zshrc).unwrap(),
            format!("{original}export LATER=1\n")
        );
    }

    #[test]
    fn uninstall_without_install_changes_nothing() {
        let (_dir, paths) = home();
        std::fs::write(&paths.zshrc, "export A=1\n").unwrap();

        let change = uninstall(&paths).unwrap();
        assert_eq!(
            change,
            ShellChange {
                snippet: false,
                block: false
            }
        );
        assert_eq!(std::fs::read_to_string(&paths.zshrc).unwrap(), "export A=1\n");
    }

    #[test]
    fn unterminated_block_is_left_alone() {
        let text = format!("{GUARD_START}\nsource x\n");
        assert!(!has_guarded_block(&text));
        assert!(remove_guarded_block(&text).is_none());
    }

    #[test]
    fn foreign_snippet_is_not_reported_installed() {
        let (_dir, paths) = home();
        std::fs::create_dir_all(paths.snippet.parent().unwrap()).unwrap();
        std::fs::write(&paths.snippet, "# my own thing\n").unwrap();
        assert!(!status(&paths).snippet_installed);
    }
}
