//! Configuration loading and layering.
//!
//! Handles `.commitgen.toml` loading, environment variable resolution,
//! and CLI flag merging with proper priority ordering.

pub mod loader;

pub use loader::{
    AdvancedConfig, AiConfig, CacheConfig, Config, ConfigError, PerformanceConfig, ProviderConfig,
};
