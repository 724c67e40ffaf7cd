//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `.commitgen.toml` in repo root
//! 4. `~/.config/commitgen/config.toml` (global defaults)
//! 5. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::constants;
use crate::env::Env;
use crate::models::ProviderName;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ai: AiConfig,
    pub performance: PerformanceConfig,
    pub cache: CacheConfig,
    pub advanced: AdvancedConfig,
}

/// AI provider settings (`[ai]`).
///
/// `provider` is kept as written; an unknown name is reported when the
/// backend is built so the pipeline can still fall back to heuristics.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub enabled: bool,
    pub provider: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("enabled", &self.enabled)
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: ProviderName::default().to_string(),
            model: None,
            base_url: None,
            api_key: None,
        }
    }
}

impl AiConfig {
    /// The subset handed to the provider factory.
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            name: self.provider.clone(),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
        }
    }
}

/// LLM provider configuration. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub name: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Input size limits (`[performance]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Byte budget for the staged patch.
    pub patch_bytes: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            patch_bytes: constants::DEFAULT_PATCH_BYTES,
        }
    }
}

/// Message cache settings (`[cache]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Less common settings (`[advanced]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedConfig {
    /// Commit conventions handed to the model. Relative paths resolve
    /// against the repository root.
    pub conventions_file: Option<PathBuf>,
}

/// One config file as written. Every key that is present overrides the
/// layers below it, even when it spells out a default.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    ai: AiLayer,
    performance: PerformanceLayer,
    cache: CacheLayer,
    advanced: AdvancedLayer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AiLayer {
    enabled: Option<bool>,
    provider: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PerformanceLayer {
    patch_bytes: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CacheLayer {
    enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AdvancedLayer {
    conventions_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads from global config, repo-local config, then applies
    /// environment variable overrides.
    /// Variables from `.env` files fill in whatever the process environment
    /// leaves unset.
    pub fn load(repo_root: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let global = Self::global_config_path();
        let env = env
            .clone()
            .with_dotenv_files(Self::dotenv_paths(dirs::home_dir().as_deref(), repo_root));
        Self::load_layers(global.as_deref(), repo_root, &env)
    }

    /// `.env` files in load order: `~/.env`, then `.env` and `.env.local`
    /// in the repository root. Later files win.
    pub fn dotenv_paths(home: Option<&Path>, repo_root: Option<&Path>) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(home) = home {
            paths.push(home.join(".env"));
        }
        if let Some(root) = repo_root {
            paths.push(root.join(".env"));
            paths.push(root.join(".env.local"));
        }
        paths
    }

    /// Layering with an explicit global config path.
    fn load_layers(
        global_path: Option<&Path>,
        repo_root: Option<&Path>,
        env: &Env,
    ) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 4: global config
        if let Some(global_path) = global_path {
            if global_path.exists() {
                let global = Self::load_file(global_path)?;
                config.apply_layer(global);
            }
        }

        // Layer 3: repo-local config
        if let Some(root) = repo_root {
            let local_path = root.join(constants::CONFIG_FILENAME);
            if local_path.exists() {
                let local = Self::load_file(&local_path)?;
                config.apply_layer(local);
            }
        }

        // Layer 2: environment variables
        config.apply_env_vars(env);

        if let Some(root) = repo_root {
            match config.advanced.conventions_file.as_ref() {
                Some(path) if path.is_relative() => {
                    config.advanced.conventions_file = Some(root.join(path));
                }
                Some(_) => {}
                None => {
                    let candidate = root.join(constants::DEFAULT_CONVENTIONS_FILE);
                    if candidate.is_file() {
                        config.advanced.conventions_file = Some(candidate);
                    }
                }
            }
        }

        Ok(config)
    }

    /// Load one config layer from a specific file.
    fn load_file(path: &Path) -> Result<ConfigLayer, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(constants::CONFIG_DIR).join("config.toml"))
    }

    /// Override every setting the layer spells out.
    fn apply_layer(&mut self, layer: ConfigLayer) {
        let ConfigLayer {
            ai,
            performance,
            cache,
            advanced,
        } = layer;

        if let Some(enabled) = ai.enabled {
            self.ai.enabled = enabled;
        }
        if let Some(provider) = ai.provider {
            self.ai.provider = provider;
        }
        if ai.model.is_some() {
            self.ai.model = ai.model;
        }
        if ai.base_url.is_some() {
            self.ai.base_url = ai.base_url;
        }
        if ai.api_key.is_some() {
            self.ai.api_key = ai.api_key;
        }

        if let Some(patch_bytes) = performance.patch_bytes {
            self.performance.patch_bytes = patch_bytes;
        }

        if let Some(enabled) = cache.enabled {
            self.cache.enabled = enabled;
        }

        if advanced.conventions_file.is_some() {
            self.advanced.conventions_file = advanced.conventions_file;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        match env.flag(constants::ENV_AI) {
            Some(Ok(enabled)) => self.ai.enabled = enabled,
            Some(Err(val)) => warn!("ignoring invalid {} value: {val}", constants::ENV_AI),
            None => {}
        }

        if let Ok(val) = env.var(constants::ENV_PROVIDER) {
            match val.parse::<ProviderName>() {
                Ok(name) => self.ai.provider = name.to_string(),
                Err(_) => warn!("ignoring invalid {} value: {val}", constants::ENV_PROVIDER),
            }
        }
        if let Ok(val) = env.var(constants::ENV_MODEL) {
            self.ai.model = Some(val);
        }
        if let Ok(val) = env.var(constants::ENV_BASE_URL) {
            self.ai.base_url = Some(val);
        }

        // Provider-specific API key resolution
        let provider_key_var = self
            .ai
            .provider
            .parse::<ProviderName>()
            .ok()
            .and_then(ProviderName::api_key_env_var);
        let api_key = env
            .var(constants::ENV_API_KEY)
            .ok()
            .or_else(|| provider_key_var.and_then(|name| env.var(name).ok()));
        if api_key.is_some() {
            self.ai.api_key = api_key;
        }

        if let Ok(val) = env.var(constants::ENV_PATCH_BYTES) {
            match val.parse::<usize>() {
                Ok(bytes) if bytes > 0 => self.performance.patch_bytes = bytes,
                _ => warn!("ignoring invalid {} value: {val}", constants::ENV_PATCH_BYTES),
            }
        }

        match env.flag(constants::ENV_CACHE) {
            Some(Ok(enabled)) => self.cache.enabled = enabled,
            Some(Err(val)) => warn!("ignoring invalid {} value: {val}", constants::ENV_CACHE),
            None => {}
        }

        if let Ok(val) = env.var(constants::ENV_CONVENTIONS_FILE) {
            self.advanced.conventions_file = Some(PathBuf::from(val));
        }
    }
}
