//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! and backend defaults so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "commitgen";

/// Crate version, as reported by `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Local config filename (e.g. `.commitgen.toml` in repo root).
pub const CONFIG_FILENAME: &str = ".commitgen.toml";

/// Directory name under `~/.config/` (global config) and `~/.cache/` (cache).
pub const CONFIG_DIR: &str = "commitgen";

/// Conventions file picked up from the repository root when none is configured.
pub const DEFAULT_CONVENTIONS_FILE: &str = "conventions.md";

/// Default byte budget for the staged patch handed to the pipeline.
pub const DEFAULT_PATCH_BYTES: usize = 100 * 1024;

/// Provider tag recorded for messages produced by the classifier.
pub const HEURISTICS_PROVIDER: &str = "heuristics";

// ── Environment variable names ──────────────────────────────────────

pub const ENV_AI: &str = "COMMITGEN_AI";
pub const ENV_PROVIDER: &str = "COMMITGEN_PROVIDER";
pub const ENV_MODEL: &str = "COMMITGEN_MODEL";
pub const ENV_API_KEY: &str = "COMMITGEN_API_KEY";
pub const ENV_BASE_URL: &str = "COMMITGEN_BASE_URL";
pub const ENV_PATCH_BYTES: &str = "COMMITGEN_PATCH_BYTES";
pub const ENV_CACHE: &str = "COMMITGEN_CACHE";
pub const ENV_CONVENTIONS_FILE: &str = "COMMITGEN_CONVENTIONS_FILE";
pub const ENV_LOG: &str = "COMMITGEN_LOG";
