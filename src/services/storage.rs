//! String key/value storage for persisted client state

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::{AppError, AppResult};

/// Storage shaped like the browser's string storage
#[cfg_attr(test, mockall::automock)]
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> AppResult<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> AppResult<()>;

    fn remove_item(&self, key: &str) -> AppResult<()>;
}

/// Storage kept in a single JSON object file
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> AppResult<BTreeMap<String, String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        // A corrupt file reads as empty; the next write replaces it
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!("Ignoring corrupt storage file {}: {}", self.path.display(), e);
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| AppError::Storage(format!("Failed to encode storage: {}", e)))?;

        // Write then rename so a crash never leaves a half-written file
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)
            .and_then(|_| fs::rename(&tmp, &self.path))
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", self.path.display(), e)))
    }
}

impl SessionStorage for FileStorage {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// Non-persistent storage
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}
