//! CLI command definitions and terminal rendering.
//!
//! Uses clap derive macros for argument definitions and `colored` for
//! human-facing output. Messages go to stdout; everything else goes to
//! stderr so the hook can capture stdout verbatim.

pub mod args;

use colored::Colorize;

use commitgen::cache::CachedMessage;
use commitgen::doctor::{CheckStatus, Report};
use commitgen::orchestrator::{MessageSource, Suggestion};

/// Diagnostic lines shown under a suggestion in non-plain mode.
pub fn suggestion_notes(suggestion: &Suggestion) -> Vec<String> {
    let mut notes = vec![format!("  via {}", suggestion.source).dimmed().to_string()];
    if let (MessageSource::Heuristics, Some(err)) = (&suggestion.source, &suggestion.provider_error) {
        notes.push(format!("  AI unavailable: {err}").yellow().to_string());
        if let Some(hint) = err.hint() {
            notes.push(format!("  hint: {hint}").dimmed().to_string());
        }
    }
    notes
}

/// Print a suggestion. `plain` prints the bare message only.
pub fn print_suggestion(suggestion: &Suggestion, plain: bool) {
    if plain {
        println!("{}", suggestion.message);
        return;
    }
    println!("{}", suggestion.message.bold());
    for note in suggestion_notes(suggestion) {
        eprintln!("{note}");
    }
}

/// One-line summary of a cached record.
pub fn describe_cached(record: &CachedMessage) -> String {
    format!(
        "{} {}",
        record.message.bold(),
        format!(
            "({} · {} · {} file(s))",
            record.provider,
            record.timestamp.format("%Y-%m-%d %H:%M UTC"),
            record.files.len()
        )
        .dimmed()
    )
}

/// Render the doctor report, one check per line.
pub fn render_report(report: &Report) -> String {
    let mut out = String::new();
    for check in &report.checks {
        let mark = match check.status {
            CheckStatus::Ok => "✔".green(),
            CheckStatus::Warn => "!".yellow(),
            CheckStatus::Fail => "✖".red(),
        };
        out.push_str(&format!("{mark} {}: {}\n", check.name, check.detail));
    }
    out
}
