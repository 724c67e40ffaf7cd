//! Content-hash based message cache.
//!
//! Remembers generated commit messages so the same staged change set does
//! not trigger a second provider call. Records expire after
//! [`CACHE_TTL_HOURS`] and are removed lazily the next time their key is
//! looked up.

pub mod store;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

pub use store::{CacheStats, FileStore};

/// Number of hex characters of the digest used as the storage identifier.
pub const CACHE_KEY_LEN: usize = 16;

/// Retention window for cached messages.
pub const CACHE_TTL_HOURS: i64 = 24;

/// Errors from cache writes. Reads never error; they degrade to a miss.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache directory could not be determined")]
    NoCacheDir,

    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize cache record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to move cache record into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// A persisted commit message and the change set it was generated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedMessage {
    pub message: String,
    pub files: Vec<String>,
    #[serde(alias = "diff_hash")]
    pub content_hash: String,
    pub timestamp: DateTime<Utc>,
    /// `"heuristics"` or the backend name that produced the message.
    pub provider: String,
}

impl CachedMessage {
    /// Whether the record is older than the retention window at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now - self.timestamp > Duration::hours(CACHE_TTL_HOURS)
    }

    /// A usable message is one non-blank line.
    pub fn is_well_formed(&self) -> bool {
        !self.message.trim().is_empty() && !self.message.contains(['\n', '\r'])
    }
}

/// Compute the cache key for a change set.
///
/// SHA-256 over every file path in order, then the patch text, hex-encoded
/// and truncated to [`CACHE_KEY_LEN`] characters.
pub fn cache_key(files: &[String], patch: &str) -> String {
    let mut hasher = Sha256::new();
    for file in files {
        hasher.update(file.as_bytes());
    }
    hasher.update(patch.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(CACHE_KEY_LEN);
    digest
}

/// The cache engine for generated messages.
pub struct CacheEngine {
    enabled: bool,
    store: FileStore,
}

impl CacheEngine {
    /// Create a cache engine over the default cache directory.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            store: FileStore::new(),
        }
    }

    /// Create an enabled cache engine rooted at `dir`.
    pub fn with_dir(dir: std::path::PathBuf) -> Self {
        Self {
            enabled: true,
            store: FileStore::new_with_dir(dir),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Look up a cached message for the change set.
    ///
    /// Expired records are deleted and reported as a miss. Records whose
    /// message is blank or spans several lines are treated as corrupt.
    pub fn get(&self, files: &[String], patch: &str) -> Option<CachedMessage> {
        if !self.enabled {
            return None;
        }
        let key = cache_key(files, patch);
        let record = self.store.get(&key)?;

        if record.is_expired_at(Utc::now()) {
            debug!(key = %key, "cache entry expired; removing");
            self.store.remove(&key);
            return None;
        }
        if !record.is_well_formed() {
            debug!(key = %key, "cache entry has a malformed message; ignoring");
            return None;
        }
        Some(record)
    }

    /// Store a message for the change set, stamped with the current time.
    ///
    /// A disabled cache accepts and discards the write.
    pub fn set(
        &self,
        files: &[String],
        patch: &str,
        message: &str,
        provider: &str,
    ) -> Result<(), CacheError> {
        if !self.enabled {
            return Ok(());
        }
        let record = CachedMessage {
            message: message.to_string(),
            files: files.to_vec(),
            content_hash: cache_key(files, patch),
            timestamp: Utc::now(),
            provider: provider.to_string(),
        };
        self.store.put(&record)
    }

    /// Most recent unexpired record, if any.
    pub fn latest(&self) -> Option<CachedMessage> {
        if !self.enabled {
            return None;
        }
        let now = Utc::now();
        self.store
            .entries()
            .into_iter()
            .filter(|r| !r.is_expired_at(now) && r.is_well_formed())
            .max_by_key(|r| r.timestamp)
    }

    /// Remove all cached entries.
    pub fn clear(&self) -> Result<CacheStats, std::io::Error> {
        self.store.clear()
    }

    /// Compute statistics about the cache.
    pub fn stats(&self) -> Result<CacheStats, std::io::Error> {
        self.store.stats()
    }

    /// Return the cache directory path.
    pub fn path(&self) -> Option<&std::path::PathBuf> {
        self.store.path()
    }
}
