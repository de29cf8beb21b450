//! Quota-limited key-value persistence.
//!
//! The whole store is one JSON object on disk mapping keys to JSON-encoded strings. Every
//! mutation rewrites the document atomically, so a crash never leaves a half-written file.

pub mod keys;

use crate::error::{CopilotError, Result};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const STORE_FILE: &str = "storage.json";

/// Default quota, matching what browsers grant an origin
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Persistent key-value store backed by `<data_dir>/storage.json`
#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    quota: usize,
    entries: BTreeMap<String, String>,
}

impl LocalStore {
    /// Opens the store in `data_dir`, creating the directory if needed.
    ///
    /// A missing document is an empty store. A document that is not a JSON object of strings is
    /// reported rather than overwritten.
    pub fn open(data_dir: &Path, quota: usize) -> Result<Self> {
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(STORE_FILE);

        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            BTreeMap::new()
        };

        debug!("Opened store at {} with {} keys", path.display(), entries.len());
        Ok(Self { path, quota, entries })
    }

    /// Location of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Configured quota in bytes
    pub fn quota(&self) -> usize {
        self.quota
    }

    /// Bytes currently used, counting keys and values
    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    /// Raw JSON text stored under `key`
    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Reads and deserializes `key`.
    ///
    /// A value that no longer parses as `T` is logged and treated as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.entries.get(key)?;
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring unreadable value for {}: {}", key, e);
                None
            }
        }
    }

    /// Reads `key`, falling back to `default` when absent or unreadable
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Serializes and writes `value` under `key`.
    ///
    /// Fails with [`CopilotError::StorageQuota`] when the store would grow past its quota; the
    /// previous value stays in place.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set_raw(key, raw)
    }

    fn set_raw(&mut self, key: &str, raw: String) -> Result<()> {
        let current = self.entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
        let needed = self.used_bytes() - current + key.len() + raw.len();
        if needed > self.quota {
            return Err(CopilotError::StorageQuota {
                key: key.to_string(),
                needed,
                quota: self.quota,
            });
        }

        let previous = self.entries.insert(key.to_string(), raw);
        if let Err(e) = self.flush() {
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    /// Deletes `key`, returning whether it existed
    pub fn remove(&mut self, key: &str) -> Result<bool> {
        if self.entries.remove(key).is_none() {
            return Ok(false);
        }
        self.flush()?;
        Ok(true)
    }

    /// All stored keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Pretty-printed JSON object of every namespaced key with its parsed value
    pub fn export(&self) -> Result<String> {
        let mut out = Map::new();
        for (key, raw) in self.entries.iter().filter(|(k, _)| keys::is_namespaced(k)) {
            let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()));
            out.insert(key.clone(), value);
        }
        Ok(serde_json::to_string_pretty(&Value::Object(out))?)
    }

    /// Writes every namespaced key of an exported document, ignoring foreign keys.
    ///
    /// The import is all-or-nothing: invalid JSON or a quota overflow leaves the store as it
    /// was. Returns the number of keys written.
    pub fn import(&mut self, json: &str) -> Result<usize> {
        let document: Value = serde_json::from_str(json)
            .map_err(|e| CopilotError::validation(format!("Invalid backup file: {}", e)))?;
        let Value::Object(map) = document else {
            return Err(CopilotError::validation("Invalid backup file: expected a JSON object"));
        };

        let mut staged = self.entries.clone();
        let mut written = 0;
        for (key, value) in map {
            if !keys::is_namespaced(&key) {
                debug!("Skipping foreign key {} during import", key);
                continue;
            }
            staged.insert(key, serde_json::to_string(&value)?);
            written += 1;
        }

        self.replace_entries(staged, "import")?;
        Ok(written)
    }

    /// Writes several values together.
    ///
    /// Either every value lands or none does: a quota overflow or a failed flush leaves the
    /// store as it was. Values are raw JSON text, as produced by `serde_json::to_string`.
    pub fn set_batch(&mut self, batch: Vec<(&str, String)>) -> Result<()> {
        let label = batch
            .iter()
            .max_by_key(|(_, raw)| raw.len())
            .map(|(key, _)| key.to_string())
            .unwrap_or_default();

        let mut staged = self.entries.clone();
        for (key, raw) in batch {
            staged.insert(key.to_string(), raw);
        }
        self.replace_entries(staged, &label)
    }

    fn replace_entries(&mut self, staged: BTreeMap<String, String>, label: &str) -> Result<()> {
        let needed: usize = staged.iter().map(|(k, v)| k.len() + v.len()).sum();
        if needed > self.quota {
            return Err(CopilotError::StorageQuota {
                key: label.to_string(),
                needed,
                quota: self.quota,
            });
        }

        let previous = std::mem::replace(&mut self.entries, staged);
        if let Err(e) = self.flush() {
            self.entries = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Removes every namespaced key, returning how many were removed
    pub fn clear_namespace(&mut self) -> Result<usize> {
        let before = self.entries.len();
        self.entries.retain(|k, _| !keys::is_namespaced(k));
        let removed = before - self.entries.len();
        if removed > 0 {
            self.flush()?;
        }
        Ok(removed)
    }

    fn flush(&self) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(serde_json::to_string(&self.entries)?.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| CopilotError::IO(e.error))?;
        Ok(())
    }
}
