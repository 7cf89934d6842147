//! Key/value storage substrates for the progress store.
//!
//! The interface mirrors browser web storage: string keys, string values,
//! no errors surfaced to callers. Backends fail soft, so a corrupt or
//! unwritable store degrades to empty state instead of propagating.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::warn;

/// A web-storage-shaped key/value substrate.
///
/// Implementations never return errors: a failed read behaves like a
/// missing key and a failed write is logged and dropped.
pub trait Storage {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str);

    /// Removes the value stored under `key`, if any.
    fn remove(&mut self, key: &str);
}

/// In-memory storage. The natural substrate for tests and for callers
/// that manage persistence themselves.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// File-backed storage holding all entries in one JSON object.
///
/// The full map is rewritten on every mutation. Load and save failures
/// are logged and swallowed, so a corrupt file behaves like a fresh
/// install rather than an error.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// Opens the store at `path`, loading any existing entries.
    ///
    /// A missing file yields an empty store; an unreadable or malformed
    /// file is logged and also yields an empty store.
    #[must_use]
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Ignoring malformed storage file");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Could not read storage file");
                BTreeMap::new()
            }
        };

        Self { path, entries }
    }

    /// Best-effort write of the full entry map.
    fn persist(&self) {
        let serialized = match serde_json::to_string_pretty(&self.entries) {
            Ok(serialized) => serialized,
            Err(err) => {
                warn!(error = %err, "Could not serialize storage entries");
                return;
            }
        };

        if let Err(err) = std::fs::write(&self.path, serialized) {
            warn!(path = %self.path.display(), error = %err, "Could not write storage file");
        }
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.persist();
        }
    }
}
