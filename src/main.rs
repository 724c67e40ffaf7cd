//! commitgen: commit message suggestions from staged changes.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use commitgen::cache;
use commitgen::config;
use commitgen::constants;
use commitgen::diff;
use commitgen::doctor;
use commitgen::env;
use commitgen::hook;
use commitgen::orchestrator;
use commitgen::shell;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use cli::args::{CacheAction, Cli, Command, InstallHookArgs, RepoArgs, SuggestArgs};
use config::Config;
use env::Env;
use orchestrator::MessageOrchestrator;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Suggest(args) => run_suggest(args).await,
        Command::Cache { action } => run_cache(action),
        Command::InstallHook(args) => run_install_hook(args).await,
        Command::UninstallHook(args) => run_uninstall_hook(args).await,
        Command::InstallShell => run_install_shell(),
        Command::UninstallShell => run_uninstall_shell(),
        Command::Doctor(args) => run_doctor(args).await,
    }
}

/// Log to stderr. `--verbose` wins over `COMMITGEN_LOG`; default is `warn`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,commitgen=debug")
    } else {
        EnvFilter::try_from_env(constants::ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn repo_root(path: &Path) -> Result<PathBuf> {
    diff::git::find_repo_root(path)
        .await
        .with_context(|| format!("cannot locate a git repository from {}", path.display()))
}

/// Print a commit message for the staged changes.
async fn run_suggest(args: SuggestArgs) -> Result<()> {
    let env = Env::real();
    let repo_root = repo_root(&args.path).await?;
    let config = Config::load(Some(&repo_root), &env).context("failed to load configuration")?;

    let change_set = diff::collect_staged(&repo_root, config.performance.patch_bytes)
        .await
        .context("failed to read staged changes")?;
    if change_set.is_empty() {
        eprintln!("No staged changes.");
        return Ok(());
    }

    let use_ai = args.ai_override().unwrap_or(config.ai.enabled);
    let cache = cache::CacheEngine::new(config.cache.enabled && !args.no_cache);
    let orchestrator = MessageOrchestrator::from_config(&config, use_ai, cache);

    let interrupted = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // No signal handler available; never cancel.
            std::future::pending::<()>().await;
        }
    };
    let suggestion = orchestrator
        .suggest_with_cancel(&change_set.files, &change_set.patch, interrupted)
        .await;

    cli::print_suggestion(&suggestion, args.plain);
    Ok(())
}

/// Manage the message cache.
fn run_cache(action: CacheAction) -> Result<()> {
    let engine = cache::CacheEngine::new(true);

    match action {
        CacheAction::Latest { plain: true } => {
            if let Some(record) = engine.latest() {
                println!("{}", record.message);
            }
        }
        CacheAction::Latest { plain: false } => match engine.latest() {
            Some(record) => println!("{}", cli::describe_cached(&record)),
            None => eprintln!("No cached messages."),
        },
        CacheAction::Clear => {
            let stats = engine.clear().context("failed to clear cache")?;
            println!(
                "Cleared {} cached entry/entries ({}).",
                stats.entries,
                stats.human_size(),
            );
        }
        CacheAction::Stats => {
            let stats = engine.stats().context("failed to read cache stats")?;
            println!("Cache entries: {}", stats.entries);
            println!("Cache size:    {}", stats.human_size());
        }
        CacheAction::Path => match engine.path() {
            Some(p) => println!("{}", p.display()),
            None => bail!("cache directory could not be determined"),
        },
    }

    Ok(())
}

async fn run_install_hook(args: InstallHookArgs) -> Result<()> {
    let repo_root = repo_root(&args.repo.path).await?;
    let hooks_dir = diff::git::hooks_dir(&repo_root)
        .await
        .context("failed to resolve the hooks directory")?;
    let binary = std::env::current_exe().context("failed to locate the commitgen binary")?;

    let path = hook::install(&hooks_dir, &binary, args.force)?;
    println!("{} {}", "Installed".green().bold(), path.display());
    Ok(())
}

async fn run_uninstall_hook(args: RepoArgs) -> Result<()> {
    let repo_root = repo_root(&args.path).await?;
    let hooks_dir = diff::git::hooks_dir(&repo_root)
        .await
        .context("failed to resolve the hooks directory")?;

    let path = hook::uninstall(&hooks_dir)?;
    println!("{} {}", "Removed".green().bold(), path.display());
    Ok(())
}

fn run_install_shell() -> Result<()> {
    let paths = shell::ShellPaths::detect()?;
    let binary = std::env::current_exe().context("failed to locate the commitgen binary")?;

    let change = shell::install(&paths, &binary)?;
    println!("{} {}", "Wrote".green().bold(), paths.snippet.display());
    if change.block {
        println!("{} {}", "Updated".green().bold(), paths.zshrc.display());
    } else {
        println!("{} already sources the snippet", paths.zshrc.display());
    }
    println!("Restart zsh or run `source {}`.", paths.zshrc.display());
    Ok(())
}

fn run_uninstall_shell() -> Result<()> {
    let paths = shell::ShellPaths::detect()?;

    let change = shell::uninstall(&paths)?;
    if change.block {
        println!("{} block from {}", "Removed".green().bold(), paths.zshrc.display());
    }
    if change.snippet {
        println!("{} {}", "Removed".green().bold(), paths.snippet.display());
    }
    if !change.block && !change.snippet {
        println!("zsh integration is not installed.");
    }
    Ok(())
}

async fn run_doctor(args: RepoArgs) -> Result<()> {
    let env = Env::real();
    let repo_root = diff::git::find_repo_root(&args.path).await.ok();
    let config =
        Config::load(repo_root.as_deref(), &env).context("failed to load configuration")?;
    let cache = cache::CacheEngine::new(config.cache.enabled);

    let shell_paths = shell::ShellPaths::detect().ok();

    let report = doctor::run(repo_root.as_deref(), &config, &cache, shell_paths.as_ref()).await;
    print!("{}", cli::render_report(&report));

    if !report.is_healthy() {
        bail!("doctor found problems; see above");
    }
    Ok(())
}
