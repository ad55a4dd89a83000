// ChiloDisco - app/store.rs
//
// Session key-value store for per-panel preferences.
//
// Two keys per log key:
//   - `cd_stick_<key>`: "1" or "0", whether the panel follows new output;
//   - `cd_fs_<key>`:    JSON object of line text -> first-seen ISO timestamp.
//
// Design principles:
// - The store is injected behind `KeyValueStore`; the dashboard never knows
//   whether it talks to memory or disk.
// - Every failure is non-fatal. Reads fall back to defaults (stick = true,
//   empty cache), writes are dropped. Both are logged at debug level only.
// - `FileStore` writes atomically (write temp, rename) on `flush`, so a crash
//   mid-save never corrupts the previous good session.

use crate::core::first_seen::FirstSeenCache;
use crate::util::constants::{FIRST_SEEN_KEY_PREFIX, STICK_KEY_PREFIX};
use crate::util::error::StoreError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// String key-value storage with session semantics.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// Persist pending writes. In-memory stores have nothing to do.
    fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// Process-lifetime store; the default.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// FileStore
// =============================================================================

/// JSON-file-backed store that survives restarts.
///
/// All reads and writes hit the in-memory map; the file is only touched by
/// `open` and `flush`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    dirty: bool,
}

impl FileStore {
    /// Open the store at `path`. A missing or corrupt file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_entries(&path) {
            Ok(entries) => {
                tracing::debug!(path = %path.display(), keys = entries.len(), "Session store loaded");
                entries
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Session store starts empty");
                BTreeMap::new()
            }
        };
        Self {
            path,
            entries,
            dirty: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        // Normal on first run.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                operation: "read",
                source: e,
            })
        }
    };
    serde_json::from_str(&content).map_err(|e| StoreError::Json {
        key: path.display().to_string(),
        source: e,
    })
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let changed = self.entries.get(key).map(String::as_str) != Some(value);
        if changed {
            self.entries.insert(key.to_string(), value.to_string());
            self.dirty = true;
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.dirty = true;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(&self.entries).map_err(|e| StoreError::Json {
            key: self.path.display().to_string(),
            source: e,
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json.as_bytes()).map_err(|e| StoreError::Io {
            path: tmp.clone(),
            operation: "write",
            source: e,
        })?;

        std::fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            StoreError::Io {
                path: self.path.clone(),
                operation: "rename",
                source: e,
            }
        })?;

        self.dirty = false;
        tracing::debug!(path = %self.path.display(), "Session store flushed");
        Ok(())
    }
}

// =============================================================================
// Per-panel preference helpers
// =============================================================================

fn stick_key(log_key: &str) -> String {
    format!("{STICK_KEY_PREFIX}{log_key}")
}

fn first_seen_key(log_key: &str) -> String {
    format!("{FIRST_SEEN_KEY_PREFIX}{log_key}")
}

/// Stick-to-bottom preference for a panel. Defaults to `true`.
pub fn stick_preference(store: &dyn KeyValueStore, log_key: &str) -> bool {
    match store.get(&stick_key(log_key)) {
        Ok(Some(v)) => v != "0",
        Ok(None) => true,
        Err(e) => {
            tracing::debug!(key = log_key, error = %e, "Stick preference unreadable, using default");
            true
        }
    }
}

/// Store the stick preference of a panel.
pub fn set_stick_preference(store: &mut dyn KeyValueStore, log_key: &str, stick: bool) {
    let value = if stick { "1" } else { "0" };
    if let Err(e) = store.set(&stick_key(log_key), value) {
        tracing::debug!(key = log_key, error = %e, "Stick preference not saved");
    }
}

/// Write the default stick preference for a panel that has none yet.
pub fn init_stick_preference(store: &mut dyn KeyValueStore, log_key: &str) {
    if let Ok(None) = store.get(&stick_key(log_key)) {
        set_stick_preference(store, log_key, true);
    }
}

/// First-seen cache of a panel. Missing or unreadable entries yield an
/// empty cache.
pub fn load_first_seen(store: &dyn KeyValueStore, log_key: &str) -> FirstSeenCache {
    let key = first_seen_key(log_key);
    let raw = match store.get(&key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return FirstSeenCache::default(),
        Err(e) => {
            tracing::debug!(key = log_key, error = %e, "First-seen cache unreadable");
            return FirstSeenCache::default();
        }
    };
    FirstSeenCache::from_json(&raw).unwrap_or_else(|e| {
        let err = StoreError::Json { key, source: e };
        tracing::debug!(error = %err, "First-seen cache discarded");
        FirstSeenCache::default()
    })
}

/// Replace the stored first-seen cache of a panel.
pub fn save_first_seen(store: &mut dyn KeyValueStore, log_key: &str, cache: &FirstSeenCache) {
    if let Err(e) = store.set(&first_seen_key(log_key), &cache.to_json()) {
        tracing::debug!(key = log_key, error = %e, "First-seen cache not saved");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use tempfile::TempDir;

    /// Store that fails every operation.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable {
                reason: "disabled".to_string(),
            })
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable {
                reason: "quota".to_string(),
            })
        }

        fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable {
                reason: "disabled".to_string(),
            })
        }
    }

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_stick_defaults_to_true_and_round_trips() {
        let mut store = MemoryStore::new();
        assert!(stick_preference(&store, "MAIN"));

        set_stick_preference(&mut store, "MAIN", false);
        assert_eq!(store.get("cd_stick_MAIN").unwrap().as_deref(), Some("0"));
        assert!(!stick_preference(&store, "MAIN"));

        // An existing preference is not overwritten by the default.
        init_stick_preference(&mut store, "MAIN");
        assert!(!stick_preference(&store, "MAIN"));
        init_stick_preference(&mut store, "OTHER");
        assert_eq!(store.get("cd_stick_OTHER").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_first_seen_round_trip_through_store() {
        let mut store = MemoryStore::new();
        let mut cache = FirstSeenCache::default();
        cache.record("line", at("2026-10-16T12:00:00Z"));
        save_first_seen(&mut store, "K", &cache);
        assert_eq!(load_first_seen(&store, "K"), cache);
        assert!(load_first_seen(&store, "OTHER").is_empty());
    }

    #[test]
    fn test_corrupt_first_seen_value_yields_empty_cache() {
        let mut store = MemoryStore::new();
        store.set("cd_fs_K", "not json").unwrap();
        assert!(load_first_seen(&store, "K").is_empty());
    }

    #[test]
    fn test_broken_store_falls_back_to_defaults() {
        let mut store = BrokenStore;
        set_stick_preference(&mut store, "K", false);
        save_first_seen(&mut store, "K", &FirstSeenCache::default());
        init_stick_preference(&mut store, "K");
        assert!(stick_preference(&store, "K"));
        assert!(load_first_seen(&store, "K").is_empty());
        assert!(store.flush().is_ok());
    }

    #[test]
    fn test_file_store_persists_after_flush() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut store = FileStore::open(&path);
        store.set("cd_stick_K", "0").unwrap();
        store.flush().expect("flush should succeed");
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("cd_stick_K").unwrap().as_deref(), Some("0"));
    }

    #[test]
    fn test_file_store_unflushed_writes_are_not_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let mut store = FileStore::open(&path);
        store.set("a", "1").unwrap();
        assert!(!path.exists());
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_file_store_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{{{{ not json").unwrap();
        let store = FileStore::open(&path);
        assert_eq!(store.get("anything").unwrap(), None);
        assert_eq!(store.path(), path.as_path());
    }
}
