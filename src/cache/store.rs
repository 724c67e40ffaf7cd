//! Filesystem-based cache store.
//!
//! Stores one JSON record per content hash in `~/.cache/commitgen/`.
//! Records are written to a temp file in the same directory and renamed
//! into place, so a concurrent reader sees either the old record, the new
//! one, or nothing.

use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use super::{CacheError, CachedMessage};

/// Filesystem-based cache store.
pub struct FileStore {
    cache_dir: Option<PathBuf>,
}

impl FileStore {
    /// Create a new file store using the default cache directory.
    pub fn new() -> Self {
        let cache_dir = dirs::cache_dir().map(|d| d.join(crate::constants::CONFIG_DIR));
        Self { cache_dir }
    }

    /// Create a file store with a specific cache directory.
    pub fn new_with_dir(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir: Some(cache_dir),
        }
    }

    /// Read a record by key. Missing or corrupt records are a miss.
    pub fn get(&self, key: &str) -> Option<CachedMessage> {
        let path = self.key_path(key)?;
        read_record(&path)
    }

    /// Write a record under its content hash.
    pub fn put(&self, record: &CachedMessage) -> Result<(), CacheError> {
        let dir = self.cache_dir.as_ref().ok_or(CacheError::NoCacheDir)?;
        std::fs::create_dir_all(dir).map_err(|source| CacheError::Io {
            path: dir.clone(),
            source,
        })?;

        let content = serde_json::to_vec(record)?;
        let final_path = dir.join(format!("{}.json", record.content_hash));

        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|source| CacheError::Io {
            path: dir.clone(),
            source,
        })?;
        let temp_path = temp.path().to_path_buf();
        temp.write_all(&content)
            .map_err(|source| CacheError::Io { path: temp_path, source })?;
        temp.persist(&final_path)?;

        Ok(())
    }

    /// Delete a record. Missing records are ignored.
    pub fn remove(&self, key: &str) {
        if let Some(path) = self.key_path(key) {
            let _ = std::fs::remove_file(path);
        }
    }

    /// All readable records. Entries that vanish or fail to parse mid-scan
    /// are skipped.
    pub fn entries(&self) -> Vec<CachedMessage> {
        let Some(dir) = self.cache_dir.as_ref() else {
            return Vec::new();
        };
        let Ok(read_dir) = std::fs::read_dir(dir) else {
            return Vec::new();
        };

        read_dir
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|e| e == "json"))
            .filter_map(|path| read_record(&path))
            .collect()
    }

    /// Remove all cached entries.
    pub fn clear(&self) -> Result<CacheStats, std::io::Error> {
        let stats = self.stats();
        if let Some(ref dir) = self.cache_dir {
            if dir.exists() {
                std::fs::remove_dir_all(dir)?;
            }
        }
        stats
    }

    /// Compute statistics about the cache.
    pub fn stats(&self) -> Result<CacheStats, std::io::Error> {
        let Some(ref dir) = self.cache_dir else {
            return Ok(CacheStats::default());
        };

        if !dir.exists() {
            return Ok(CacheStats::default());
        }

        let mut entries: usize = 0;
        let mut total_bytes: u64 = 0;

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json") {
                entries += 1;
                total_bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
            }
        }

        Ok(CacheStats {
            entries,
            total_bytes,
        })
    }

    /// Return the cache directory path.
    pub fn path(&self) -> Option<&PathBuf> {
        self.cache_dir.as_ref()
    }

    /// Get the file path for a cache key.
    fn key_path(&self, key: &str) -> Option<PathBuf> {
        self.cache_dir.as_ref().map(|dir| dir.join(format!("{key}.json")))
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

fn read_record(path: &std::path::Path) -> Option<CachedMessage> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(record) => Some(record),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "skipping unreadable cache record");
            None
        }
    }
}

/// Statistics about the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached entries.
    pub entries: usize,
    /// Total size in bytes.
    pub total_bytes: u64,
}

impl CacheStats {
    /// Format total_bytes as a human-readable string.
    pub fn human_size(&self) -> String {
        const KB: u64 = 1024;
        const MB: u64 = 1024 * KB;

        if self.total_bytes >= MB {
            format!("{:.1} MiB", self.total_bytes as f64 / MB as f64)
        } else if self.total_bytes >= KB {
            format!("{:.1} KiB", self.total_bytes as f64 / KB as f64)
        } else {
            format!("{} B", self.total_bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_store(dir: &std::path::Path) -> FileStore {
        FileStore {
            cache_dir: Some(dir.to_path_buf()),
        }
    }

    fn sample(hash: &str) -> CachedMessage {
        CachedMessage {
            message: "feat: add parser".into(),
            files: vec!["src/parser.rs".into()],
            content_hash: hash.into(),
            timestamp: Utc::now(),
            provider: "openai".into(),
        }
    }

    #[test]
    fn roundtrip_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());

        store.put(&sample("0123456789abcdef")).unwrap();
        let cached = store.get("0123456789abcdef").unwrap();
        assert_eq!(cached.message, "feat: add parser");
        assert_eq!(cached.files, vec!["src/parser.rs"]);
    }

    #[test]
    fn put_overwrites_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());
        store.put(&sample("k")).unwrap();
        let mut newer = sample("k");
        newer.message = "fix: parser".into();
        store.put(&newer).unwrap();

        assert_eq!(store.get("k").unwrap().message, "fix: parser");
        assert_eq!(store.stats().unwrap().entries, 1);
    }

    #[test]
    fn put_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = make_store(&nested);
        store.put(&sample("k")).unwrap();
        // Re-initialising over an existing namespace is fine.
        store.put(&sample("k2")).unwrap();
        assert_eq!(store.entries().len(), 2);
    }

    #[test]
    fn put_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());
        store.put(&sample("k")).unwrap();
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["k.json"]);
    }

    #[test]
    fn cache_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());
        assert!(store.get("nonexistent").is_none());
    }

    #[test]
    fn corrupt_record_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{\"message\": 3").unwrap();
        let store = make_store(dir.path());
        assert!(store.get("bad").is_none());
        assert!(store.entries().is_empty());
    }

    #[test]
    fn entries_ignores_non_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());
        store.put(&sample("k")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        assert_eq!(store.entries().len(), 1);
    }

    #[test]
    fn remove_missing_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        make_store(dir.path()).remove("ghost");
    }

    #[test]
    fn stats_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir.path().join("cache"));
        let stats = store.stats().unwrap();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.total_bytes, 0);
    }

    #[test]
    fn clear_removes_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join("cache");
        let store = make_store(&cache_dir);
        store.put(&sample("k1")).unwrap();
        assert!(store.get("k1").is_some());

        let stats = store.clear().unwrap();
        assert_eq!(stats.entries, 1);
        assert!(!cache_dir.exists());
    }

    #[test]
    fn clear_empty_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir.path().join("nonexistent_cache"));
        let stats = store.clear().unwrap();
        assert_eq!(stats.entries, 0);
    }

    #[test]
    fn put_without_dir_errors() {
        let store = FileStore { cache_dir: None };
        assert!(matches!(store.put(&sample("k")), Err(CacheError::NoCacheDir)));
        assert!(store.path().is_none());
    }

    #[test]
    fn human_size_units() {
        assert_eq!(CacheStats { entries: 1, total_bytes: 500 }.human_size(), "500 B");
        assert_eq!(CacheStats { entries: 1, total_bytes: 2048 }.human_size(), "2.0 KiB");
        assert_eq!(
            CacheStats { entries: 1, total_bytes: 2 * 1024 * 1024 }.human_size(),
            "2.0 MiB"
        );
    }
}
