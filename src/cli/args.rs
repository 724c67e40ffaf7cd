//! Clap argument types.

use clap::Parser;
use std::path::PathBuf;

/// Commit message suggestions from staged changes.
#[derive(Parser, Debug)]
#[command(
    name = commitgen::constants::APP_NAME,
    version = commitgen::constants::VERSION,
    about = "Suggest a commit message for the staged changes, using AI when configured and heuristics otherwise",
)]
pub struct Cli {
    /// Enable debug logging on stderr (overrides COMMITGEN_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Print a commit message for the staged changes.
    Suggest(SuggestArgs),

    /// Inspect or manage the message cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Install the prepare-commit-msg hook in the current repository.
    InstallHook(InstallHookArgs),

    /// Remove the prepare-commit-msg hook installed by commitgen.
    UninstallHook(RepoArgs),

    /// Install the zsh ghost-text integration and source it from ~/.zshrc.
    InstallShell,

    /// Remove the zsh integration and its ~/.zshrc block.
    UninstallShell,

    /// Check the repository, hook, shell integration, and configuration.
    Doctor(RepoArgs),
}

/// Arguments for the `suggest` subcommand.
#[derive(Parser, Debug)]
pub struct SuggestArgs {
    /// Use the configured AI provider even if `[ai] enabled = false`.
    #[arg(long, default_value_t = false, conflicts_with = "no_ai")]
    pub ai: bool,

    /// Use heuristics only.
    #[arg(long, default_value_t = false)]
    pub no_ai: bool,

    /// Print only the message, with no colour or diagnostics.
    #[arg(long, default_value_t = false)]
    pub plain: bool,

    /// Neither read nor write the message cache.
    #[arg(long, default_value_t = false)]
    pub no_cache: bool,

    /// Path inside the repository (default: current directory).
    #[arg(long, default_value = ".")]
    pub path: PathBuf,
}

impl SuggestArgs {
    /// `Some` when a flag overrides the configured AI setting.
    pub fn ai_override(&self) -> Option<bool> {
        match (self.ai, self.no_ai) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// Cache management subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum CacheAction {
    /// Print the most recent unexpired cached message.
    Latest {
        /// Print only the message, or nothing when the cache is empty.
        #[arg(long, default_value_t = false)]
        plain: bool,
    },
    /// Remove all cached messages.
    Clear,
    /// Show cache statistics (entry count and size).
    Stats,
    /// Print the cache directory path.
    Path,
}

/// Arguments for the `install-hook` subcommand.
#[derive(Parser, Debug)]
pub struct InstallHookArgs {
    /// Overwrite an existing prepare-commit-msg hook from another tool.
    #[arg(long, default_value_t = false)]
    pub force: bool,

    #[command(flatten)]
    pub repo: RepoArgs,
}

/// Repository location shared by several subcommands.
#[derive(Parser, Debug)]
pub struct RepoArgs {
    /// Path inside the repository (default: current directory).
    #[arg(long, default_value = ".")]
    pub path: PathBuf,
}
