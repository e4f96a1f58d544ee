//! Persistent string-keyed snapshot stores.
//!
//! A [`SnapshotStore`] is the get/set/remove seam the cart persists through.
//! It mirrors the shape of a browser's local storage: string keys, string
//! values, no transactions, no ordering guarantees with respect to readers
//! in other processes.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Errors from a snapshot store.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Underlying I/O failure.
    #[error("snapshot i/o error: {0}")]
    Io(#[from] io::Error),

    /// The in-memory store's lock was poisoned.
    #[error("snapshot store lock poisoned")]
    Poisoned,
}

/// A persistent string-keyed store.
pub trait SnapshotStore {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, SnapshotError>;

    /// Overwrite the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the store cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), SnapshotError>;

    /// Delete `key` entirely; absent keys are a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the store cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), SnapshotError>;
}

/// In-memory snapshot store.
///
/// Clones share the same underlying map, which lets tests (and in-process
/// consumers) model storage that outlives a single cart instance.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySnapshotStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn get(&self, key: &str) -> Result<Option<String>, SnapshotError> {
        let map = self.inner.lock().map_err(|_| SnapshotError::Poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SnapshotError> {
        let mut map = self.inner.lock().map_err(|_| SnapshotError::Poisoned)?;
        map.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SnapshotError> {
        let mut map = self.inner.lock().map_err(|_| SnapshotError::Poisoned)?;
        map.remove(key);
        Ok(())
    }
}

/// File-backed snapshot store: one file per key under a base directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store rooted at `dir`. The directory is created lazily on
    /// first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are caller-controlled identifiers, not arbitrary user input;
        // keep path separators out of the filename regardless.
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn get(&self, key: &str) -> Result<Option<String>, SnapshotError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SnapshotError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SnapshotError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn scratch_dir() -> PathBuf {
        let seq = DIR_SEQ.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("orchard-cart-test-{}-{seq}", std::process::id()))
    }

    #[test]
    fn test_memory_roundtrip() {
        let mut store = MemorySnapshotStore::new();
        assert_eq!(store.get("cart").unwrap(), None);

        store.set("cart", "[1,2]").unwrap();
        assert_eq!(store.get("cart").unwrap().as_deref(), Some("[1,2]"));

        store.remove("cart").unwrap();
        assert_eq!(store.get("cart").unwrap(), None);
    }

    #[test]
    fn test_memory_clones_share_state() {
        let mut store = MemorySnapshotStore::new();
        let twin = store.clone();

        store.set("cart", "[]").unwrap();
        assert_eq!(twin.get("cart").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_memory_remove_absent_is_noop() {
        let mut store = MemorySnapshotStore::new();
        store.remove("missing").unwrap();
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = scratch_dir();
        let mut store = FileSnapshotStore::new(&dir);

        assert_eq!(store.get("cart").unwrap(), None);
        store.set("cart", "[42]").unwrap();
        assert_eq!(store.get("cart").unwrap().as_deref(), Some("[42]"));

        store.remove("cart").unwrap();
        assert_eq!(store.get("cart").unwrap(), None);
        store.remove("cart").unwrap();

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_file_keys_are_sanitized() {
        let dir = scratch_dir();
        let store = FileSnapshotStore::new(&dir);
        let path = store.path_for("../evil/key");
        assert!(path.starts_with(&dir));
        assert_eq!(path.file_name().unwrap(), "___evil_key.json");
    }
}
