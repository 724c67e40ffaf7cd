//! Environment diagnostics for `commitgen doctor`.
//!
//! Every check is read-only and local; no provider request is made.

use std::path::Path;

use crate::cache::CacheEngine;
use crate::config::Config;
use crate::diff::git;
use crate::hook::{self, HookStatus};
use crate::providers::{self, Conventions};
use crate::shell::{self, ShellPaths};

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    /// Worth knowing, but `suggest` still works.
    Warn,
    /// `suggest` cannot work until this is fixed.
    Fail,
}

/// One line of the doctor report.
#[derive(Debug, Clone)]
pub struct Check {
    pub name: &'static str,
    pub status: CheckStatus,
    pub detail: String,
}

impl Check {
    fn new(name: &'static str, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name,
            status,
            detail: detail.into(),
        }
    }
}

/// All checks, in display order.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub checks: Vec<Check>,
}

impl Report {
    /// `true` when no check failed.
    pub fn is_healthy(&self) -> bool {
        self.checks.iter().all(|c| c.status != CheckStatus::Fail)
    }

    pub fn get(&self, name: &str) -> Option<&Check> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// Run every check. `repo_root` is `None` outside a git repository and
/// `shell` is `None` when there is no home directory to look in.
pub async fn run(
    repo_root: Option<&Path>,
    config: &Config,
    cache: &CacheEngine,
    shell: Option<&ShellPaths>,
) -> Report {
    let mut checks = Vec::new();

    match repo_root {
        Some(root) => {
            checks.push(Check::new("git repository", CheckStatus::Ok, root.display().to_string()));
            checks.push(hook_check(root).await);
            checks.push(staged_check(root).await);
        }
        None => checks.push(Check::new(
            "git repository",
            CheckStatus::Fail,
            "not inside a git repository",
        )),
    }

    checks.push(ai_check(config));
    checks.push(conventions_check(config));
    checks.push(cache_check(cache));
    if let Some(paths) = shell {
        checks.extend(shell_checks(paths));
    }

    Report { checks }
}

async fn hook_check(root: &Path) -> Check {
    let hooks_dir = match git::hooks_dir(root).await {
        Ok(dir) => dir,
        Err(e) => return Check::new("prepare-commit-msg hook", CheckStatus::Warn, e.to_string()),
    };
    let path = hook::hook_path(&hooks_dir);
    match hook::status(&hooks_dir) {
        HookStatus::Installed => Check::new(
            "prepare-commit-msg hook",
            CheckStatus::Ok,
            path.display().to_string(),
        ),
        HookStatus::Missing => Check::new(
            "prepare-commit-msg hook",
            CheckStatus::Warn,
            "not installed (run `commitgen install-hook`)",
        ),
        HookStatus::Foreign => Check::new(
            "prepare-commit-msg hook",
            CheckStatus::Warn,
            format!("{} belongs to another tool", path.display()),
        ),
    }
}

async fn staged_check(root: &Path) -> Check {
    match git::staged_files(root).await {
        Ok(files) if files.is_empty() => Check::new(
            "staged files",
            CheckStatus::Warn,
            "none (`commitgen suggest` needs staged changes)",
        ),
        Ok(files) => Check::new("staged files", CheckStatus::Ok, files.len().to_string()),
        Err(e) => Check::new("staged files", CheckStatus::Fail, e.to_string()),
    }
}

fn ai_check(config: &Config) -> Check {
    if !config.ai.enabled {
        return Check::new("ai provider", CheckStatus::Ok, "disabled (heuristics only)");
    }
    match providers::build_provider(&config.ai.provider_config(), Conventions::builtin()) {
        Ok(provider) if provider.is_configured() => Check::new(
            "ai provider",
            CheckStatus::Ok,
            format!("{} ready", provider.name()),
        ),
        Ok(provider) => Check::new(
            "ai provider",
            CheckStatus::Warn,
            format!("{} is missing a model or base URL", provider.name()),
        ),
        Err(e) => {
            let detail = match e.hint() {
                Some(hint) => format!("{e} ({hint}); falling back to heuristics"),
                None => format!("{e}; falling back to heuristics"),
            };
            Check::new("ai provider", CheckStatus::Warn, detail)
        }
    }
}

fn conventions_check(config: &Config) -> Check {
    let requested = config.advanced.conventions_file.as_deref();
    let conventions = Conventions::load(requested);
    match (requested, conventions.source()) {
        (Some(path), providers::prompt::ConventionsSource::Builtin) => Check::new(
            "conventions",
            CheckStatus::Warn,
            format!("{} unreadable or empty; using built-in", path.display()),
        ),
        (_, source) => Check::new("conventions", CheckStatus::Ok, source.to_string()),
    }
}

fn cache_check(cache: &CacheEngine) -> Check {
    if !cache.is_enabled() {
        return Check::new("cache", CheckStatus::Ok, "disabled");
    }
    let Some(path) = cache.path() else {
        return Check::new("cache", CheckStatus::Warn, "no cache directory available");
    };
    match cache.stats() {
        Ok(stats) => Check::new(
            "cache",
            CheckStatus::Ok,
            format!("{} ({} entries, {})", path.display(), stats.entries, stats.human_size()),
        ),
        Err(e) => Check::new("cache", CheckStatus::Warn, format!("{}: {e}", path.display())),
    }
}

fn shell_checks(paths: &ShellPaths) -> [Check; 2] {
    let status = shell::status(paths);
    let snippet = if status.snippet_installed {
        Check::new("zsh snippet", CheckStatus::Ok, paths.snippet.display().to_string())
    } else {
        Check::new(
            "zsh snippet",
            CheckStatus::Warn,
            "not installed (run `commitgen install-shell`)",
        )
    };
    let block = if status.block_present {
        Check::new("zshrc block", CheckStatus::Ok, paths.zshrc.display().to_string())
    } else {
        Check::new(
            "zshrc block",
            CheckStatus::Warn,
            format!("{} does not source the snippet", paths.zshrc.display()),
        )
    };
    [snippet, block]
}
