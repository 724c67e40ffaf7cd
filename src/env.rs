//! Environment variable abstraction for testability.
//!
//! Production code uses [`Env::real()`] which delegates to [`std::env::var`].
//! Tests use [`Env::mock()`] backed by a `HashMap`, so config layering can be
//! exercised without mutating the process environment.
//!
//! Values read from `.env` files sit underneath either source: they only
//! answer for names the environment itself leaves unset.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

/// Environment variable reader.
#[derive(Clone, Debug)]
pub struct Env {
    overrides: Option<HashMap<String, String>>,
    dotenv: HashMap<String, String>,
}

impl Env {
    /// Create an `Env` that reads from the real process environment.
    pub fn real() -> Self {
        Self {
            overrides: None,
            dotenv: HashMap::new(),
        }
    }

    /// Create an `Env` backed by explicit key-value pairs.
    #[cfg(test)]
    pub fn mock(vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            overrides: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            dotenv: HashMap::new(),
        }
    }

    /// Add fallback values from `.env` files, in order; later files win.
    ///
    /// Missing files are skipped. Unreadable files and malformed lines are
    /// logged and skipped. The process environment is never modified.
    pub fn with_dotenv_files<P: AsRef<Path>>(mut self, paths: impl IntoIterator<Item = P>) -> Self {
        for path in paths {
            let path = path.as_ref();
            let entries = match dotenvy::from_path_iter(path) {
                Ok(entries) => entries,
                Err(e) if e.not_found() => continue,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot read .env file");
                    continue;
                }
            };
            debug!(path = %path.display(), "loading .env file");
            for entry in entries {
                match entry {
                    Ok((key, value)) => {
                        self.dotenv.insert(key, value);
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping malformed .env entry");
                    }
                }
            }
        }
        self
    }

    /// Look up an environment variable by name.
    ///
    /// Empty values are reported as absent, matching how shells commonly
    /// "unset" a variable with `FOO=`.
    pub fn var(&self, name: &str) -> Result<String, std::env::VarError> {
        let primary = match &self.overrides {
            Some(map) => map.get(name).cloned(),
            None => match std::env::var(name) {
                Ok(value) => Some(value),
                Err(std::env::VarError::NotPresent) => None,
                Err(e) => return Err(e),
            },
        };
        primary
            .filter(|v| !v.is_empty())
            .or_else(|| self.dotenv.get(name).cloned())
            .filter(|v| !v.is_empty())
            .ok_or(std::env::VarError::NotPresent)
    }

    /// Returns `true` if the variable is present (non-empty).
    pub fn is_set(&self, name: &str) -> bool {
        self.var(name).is_ok()
    }

    /// Parse a boolean-ish variable (`true/1/yes/on`, `false/0/no/off`).
    ///
    /// Returns `None` when the variable is absent, `Some(Err(raw))` when it is
    /// present but unrecognised.
    pub fn flag(&self, name: &str) -> Option<Result<bool, String>> {
        let raw = self.var(name).ok()?;
        Some(match raw.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(raw),
        })
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::real()
    }
}
