//! Persisted credential pair (bearer token + serialized identity).
//!
//! Two keys only: `token` and `user`. The store knows nothing about
//! their meaning; the session store decides what a valid pair is.
//!
//! Backends:
//! - `MemoryCredentialStore`: process lifetime only
//! - `FileCredentialStore`: JSON map on disk, replaced atomically on write

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use zeroize::Zeroize;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Credential file is not valid JSON: {0}")]
    Corrupt(String),
    #[error("Credential store lock poisoned")]
    LockPoisoned,
}

/// Key/value persistence for the session credentials.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError>;
    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError>;
    fn remove(&self, key: &str) -> Result<(), CredentialError>;
}

// ═══════════════════════════════════════════════════════════
// In-memory store
// ═══════════════════════════════════════════════════════════

#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        let entries = self.entries.lock().map_err(|_| CredentialError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        let mut entries = self.entries.lock().map_err(|_| CredentialError::LockPoisoned)?;
        if let Some(mut old) = entries.insert(key.to_string(), value.to_string()) {
            old.zeroize();
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CredentialError> {
        let mut entries = self.entries.lock().map_err(|_| CredentialError::LockPoisoned)?;
        if let Some(mut old) = entries.remove(key) {
            old.zeroize();
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// File store
// ═══════════════════════════════════════════════════════════

/// JSON object on disk, one string per key.
///
/// Every write goes to a temp file in the same directory and is then
/// renamed over the target, so a crash never leaves half a file.
pub struct FileCredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> CredentialError {
        CredentialError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn load(&self) -> Result<HashMap<String, String>, CredentialError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(self.io_err(e)),
        };
        if data.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&data).map_err(|e| CredentialError::Corrupt(e.to_string()))
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<(), CredentialError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir).map_err(|e| self.io_err(e))?;

        let mut json =
            serde_json::to_vec_pretty(entries).map_err(|e| CredentialError::Corrupt(e.to_string()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| self.io_err(e))?;
        let written = tmp.write_all(&json).and_then(|_| tmp.as_file().sync_all());
        json.zeroize();
        written.map_err(|e| self.io_err(e))?;

        tmp.persist(&self.path).map_err(|e| self.io_err(e.error))?;
        Ok(())
    }

    fn modify<F>(&self, f: F) -> Result<(), CredentialError>
    where
        F: FnOnce(&mut HashMap<String, String>),
    {
        let _guard = self.write_lock.lock().map_err(|_| CredentialError::LockPoisoned)?;
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(CredentialError::Corrupt(reason)) => {
                tracing::warn!(path = %self.path.display(), reason = %reason, "Discarding corrupt credential file");
                HashMap::new()
            }
            Err(e) => return Err(e),
        };
        f(&mut entries);
        self.save(&entries)
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), CredentialError> {
        self.modify(|entries| {
            entries.remove(key);
        })
    }
}
