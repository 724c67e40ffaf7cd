//! Message orchestrator: cache lookup, one provider attempt, heuristic fallback.
//!
//! [`MessageOrchestrator::suggest`] never fails. Whatever goes wrong with
//! the provider is reported on the returned [`Suggestion`] and the
//! classifier supplies the message instead.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::CacheEngine;
use crate::config::Config;
use crate::heuristics;
use crate::providers::{self, CommitProvider, Conventions, ProviderError};

/// Where a suggested message came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSource {
    Cache,
    /// Generated by the named backend.
    Provider(String),
    Heuristics,
}

impl fmt::Display for MessageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageSource::Cache => write!(f, "cache"),
            MessageSource::Provider(name) => write!(f, "{name}"),
            MessageSource::Heuristics => write!(f, "{}", crate::constants::HEURISTICS_PROVIDER),
        }
    }
}

/// A commit message and how it was produced.
#[derive(Debug, Clone)]
pub struct Suggestion {
    pub message: String,
    pub source: MessageSource,
    /// Why the provider was skipped or failed, when the message came from
    /// the classifier instead.
    pub provider_error: Option<ProviderError>,
}

impl Suggestion {
    fn heuristic(files: &[String], patch: &str, provider_error: Option<ProviderError>) -> Self {
        Self {
            message: heuristics::classify(files, patch),
            source: MessageSource::Heuristics,
            provider_error,
        }
    }
}

/// Runs the synthesis pipeline for one change set.
pub struct MessageOrchestrator {
    provider: Option<Arc<dyn CommitProvider>>,
    /// Set when the provider was requested but could not be built.
    setup_error: Option<ProviderError>,
    cache: CacheEngine,
}

impl MessageOrchestrator {
    /// Create an orchestrator with an already-built provider (or none).
    pub fn new(provider: Option<Arc<dyn CommitProvider>>, cache: CacheEngine) -> Self {
        Self {
            provider,
            setup_error: None,
            cache,
        }
    }

    /// Build the provider from `config` when `use_ai` is set.
    ///
    /// Construction errors are kept and surfaced on every suggestion rather
    /// than returned, so the classifier still runs.
    pub fn from_config(config: &Config, use_ai: bool, cache: CacheEngine) -> Self {
        if !use_ai {
            return Self::new(None, cache);
        }

        let conventions = Conventions::load(config.advanced.conventions_file.as_deref());
        match providers::build_provider(&config.ai.provider_config(), conventions) {
            Ok(provider) => Self::new(Some(Arc::from(provider)), cache),
            Err(e) => {
                debug!(error = %e, "provider unavailable; heuristics only");
                Self {
                    provider: None,
                    setup_error: Some(e),
                    cache,
                }
            }
        }
    }

    pub fn cache(&self) -> &CacheEngine {
        &self.cache
    }

    /// Produce a message for the change set. Never fails.
    pub async fn suggest(&self, files: &[String], patch: &str) -> Suggestion {
        self.suggest_with_cancel(files, patch, std::future::pending()).await
    }

    /// Like [`suggest`](Self::suggest), but abandons the provider call when
    /// `cancel` completes first.
    pub async fn suggest_with_cancel<F>(&self, files: &[String], patch: &str, cancel: F) -> Suggestion
    where
        F: Future<Output = ()>,
    {
        if files.is_empty() {
            return Suggestion::heuristic(files, patch, None);
        }

        if let Some(hit) = self.cache.get(files, patch) {
            debug!(provider = %hit.provider, "cache hit");
            return Suggestion {
                message: hit.message,
                source: MessageSource::Cache,
                provider_error: None,
            };
        }

        let Some(provider) = self.provider.as_ref() else {
            if let Some(e) = &self.setup_error {
                warn!("AI provider unavailable, using heuristics: {e}");
            }
            return Suggestion::heuristic(files, patch, self.setup_error.clone());
        };

        if !provider.is_configured() {
            let e = ProviderError::NotConfigured(provider.name().to_string());
            warn!("AI provider unavailable, using heuristics: {e}");
            return Suggestion::heuristic(files, patch, Some(e));
        }

        debug!(provider = provider.name(), files = files.len(), "calling provider");
        let result = tokio::select! {
            biased;
            () = cancel => Err(ProviderError::Cancelled {
                provider: provider.name().to_string(),
            }),
            result = provider.generate(files, patch) => result,
        };

        match result {
            Ok(message) => {
                if let Err(e) = self.cache.set(files, patch, &message, provider.name()) {
                    warn!("failed to cache commit message: {e}");
                }
                Suggestion {
                    message,
                    source: MessageSource::Provider(provider.name().to_string()),
                    provider_error: None,
                }
            }
            Err(e) => {
                warn!(category = ?e.category(), "AI generation failed, using heuristics: {e}");
                Suggestion::heuristic(files, patch, Some(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedProvider {
        reply: Result<String, ProviderError>,
        configured: bool,
        calls: AtomicUsize,
    }

    impl FixedProvider {
        fn ok(message: &str) -> Self {
            Self {
                reply: Ok(message.to_string()),
                configured: true,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(err: ProviderError) -> Self {
            Self {
                reply: Err(err),
                configured: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CommitProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn generate(&self, _files: &[String], _patch: &str) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    struct HangingProvider;

    #[async_trait]
    impl CommitProvider for HangingProvider {
        fn name(&self) -> &str {
            "hanging"
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn generate(&self, _files: &[String], _patch: &str) -> Result<String, ProviderError> {
            std::future::pending().await
        }
    }

    fn files(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[tokio::test]
    async fn no_provider_uses_heuristics() {
        let dir = tempfile::tempdir().unwrap();
        let orch = MessageOrchestrator::new(None, CacheEngine::with_dir(dir.path().to_path_buf()));
        let s = orch.suggest(&files(&["README.md"]), "+docs").await;
        assert_eq!(s.source, MessageSource::Heuristics);
        assert!(s.message.starts_with("docs:"));
        assert!(s.provider_error.is_none());
    }

    #[tokio::test]
    async fn provider_result_is_cached_and_reused() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(FixedProvider::ok("feat: add widget"));
        let orch = MessageOrchestrator::new(
            Some(provider.clone() as Arc<dyn CommitProvider>),
            CacheEngine::with_dir(dir.path().to_path_buf()),
        );
        let f = files(&["src/widget.rs"]);

        let first = orch.suggest(&f, "+widget").await;
        assert_eq!(first.source, MessageSource::Provider("fixed".into()));
        assert_eq!(first.message, "feat: add widget");

        let second = orch.suggest(&f, "+widget").await;
        assert_eq!(second.source, MessageSource::Cache);
        assert_eq!(second.message, "feat: add widget");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn provider_failure_falls_back_and_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(FixedProvider::failing(ProviderError::RateLimited {
            provider: "fixed".into(),
        }));
        let cache = CacheEngine::with_dir(dir.path().to_path_buf());
        let orch = MessageOrchestrator::new(Some(provider as Arc<dyn CommitProvider>), cache);
        let f = files(&["src/a.go", "src/b.go", "src/c.go"]);

        let s = orch.suggest(&f, "-broken\n+fix the loop").await;
        assert_eq!(s.source, MessageSource::Heuristics);
        assert_eq!(s.message, "fix: update src/a.go, src/b.go and 1 more files");
        assert!(matches!(s.provider_error, Some(ProviderError::RateLimited { .. })));
        assert!(orch.cache().latest().is_none());
    }

    #[tokio::test]
    async fn malformed_cache_record_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let f = files(&["README.md"]);
        let patch = "+Install steps for the readme";
        crate::cache::FileStore::new_with_dir(dir.path().to_path_buf())
            .put(&crate::cache::CachedMessage {
                message: "feat: one\nsecond line".into(),
                files: f.clone(),
                content_hash: crate::cache::cache_key(&f, patch),
                timestamp: chrono::Utc::now(),
                provider: "openai".into(),
            })
            .unwrap();

        let orch = MessageOrchestrator::new(None, CacheEngine::with_dir(dir.path().to_path_buf()));
        let s = orch.suggest(&f, patch).await;
        assert_eq!(s.source, MessageSource::Heuristics);
        assert_eq!(s.message, "docs: update README");
    }

    #[tokio::test]
    async fn unconfigured_provider_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(FixedProvider {
            configured: false,
            ..FixedProvider::ok("feat: nope")
        });
        let orch = MessageOrchestrator::new(
            Some(provider.clone() as Arc<dyn CommitProvider>),
            CacheEngine::with_dir(dir.path().to_path_buf()),
        );
        let s = orch.suggest(&files(&["a.rs"]), "+x").await;
        assert!(matches!(s.provider_error, Some(ProviderError::NotConfigured(_))));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancellation_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let orch = MessageOrchestrator::new(
            Some(Arc::new(HangingProvider) as Arc<dyn CommitProvider>),
            CacheEngine::with_dir(dir.path().to_path_buf()),
        );
        let s = orch
            .suggest_with_cancel(&files(&["a.rs"]), "+x", async {})
            .await;
        assert_eq!(s.source, MessageSource::Heuristics);
        assert!(matches!(s.provider_error, Some(ProviderError::Cancelled { .. })));
    }

    #[tokio::test]
    async fn empty_change_set_skips_everything() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(FixedProvider::ok("feat: x"));
        let orch = MessageOrchestrator::new(
            Some(provider.clone() as Arc<dyn CommitProvider>),
            CacheEngine::with_dir(dir.path().to_path_buf()),
        );
        let s = orch.suggest(&[], "").await;
        assert_eq!(s.message, "chore: add missing files");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_backend_in_config_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.ai.provider = "mystery".into();
        let orch = MessageOrchestrator::from_config(
            &config,
            true,
            CacheEngine::with_dir(dir.path().to_path_buf()),
        );
        let s = orch.suggest(&files(&["src/lib.rs"]), "+a\n+b\n+c").await;
        assert_eq!(s.source, MessageSource::Heuristics);
        assert_eq!(s.message, "feat: update src/lib.rs");
        assert!(matches!(s.provider_error, Some(ProviderError::UnknownBackend(_))));
    }

    #[tokio::test]
    async fn ai_disabled_records_no_error() {
        let dir = tempfile::tempdir().unwrap();
        let orch = MessageOrchestrator::from_config(
            &Config::default(),
            false,
            CacheEngine::with_dir(dir.path().to_path_buf()),
        );
        let s = orch.suggest(&files(&["src/lib.rs"]), "+a").await;
        assert!(s.provider_error.is_none());
    }

    #[test]
    fn source_display() {
        assert_eq!(MessageSource::Cache.to_string(), "cache");
        assert_eq!(MessageSource::Provider("openai".into()).to_string(), "openai");
        assert_eq!(MessageSource::Heuristics.to_string(), "heuristics");
    }
}
