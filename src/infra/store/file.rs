//! File-backed store.
//!
//! The whole document map is kept in memory and written to `<dir>/<stream>.json` on
//! [`DurableStore::flush`]. The file is loaded when the store is opened, so a cold
//! restart picks up exactly what was last flushed.

use std::collections::BTreeMap;
use std::fs::{self, create_dir_all, OpenOptions};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::DurableStore;
use crate::core::SchedulerError;

/// JSON-file store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    stream: String,
    entries: BTreeMap<String, Value>,
    dirty: bool,
}

impl FileStore {
    /// Open (or create) a store under `path` named `stream`.
    pub fn open(path: impl AsRef<Path>, stream: impl Into<String>) -> Result<Self, SchedulerError> {
        let path = path.as_ref().to_path_buf();
        let stream = stream.into();
        create_dir_all(&path).map_err(|e| SchedulerError::Backend(e.to_string()))?;
        let mut store = Self {
            path,
            stream,
            entries: BTreeMap::new(),
            dirty: false,
        };
        store.load_from_disk()?;
        Ok(store)
    }

    /// Location of the backing file.
    #[must_use]
    pub fn file_path(&self) -> PathBuf {
        self.path.join(format!("{}.json", self.stream))
    }

    fn load_from_disk(&mut self) -> Result<(), SchedulerError> {
        let file_path = self.file_path();
        if !file_path.exists() {
            return Ok(());
        }
        let file = OpenOptions::new()
            .read(true)
            .open(&file_path)
            .map_err(|e| SchedulerError::Backend(e.to_string()))?;
        self.entries = serde_json::from_reader(BufReader::new(file))?;
        tracing::debug!(path = %file_path.display(), keys = self.entries.len(), "store loaded");
        Ok(())
    }

    fn rewrite_disk(&self) -> Result<(), SchedulerError> {
        let file_path = self.file_path();
        let tmp_path = self.path.join(format!("{}.json.tmp", self.stream));
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)
            .map_err(|e| SchedulerError::Backend(e.to_string()))?;
        let body = serde_json::to_vec(&self.entries)?;
        file.write_all(&body)
            .map_err(|e| SchedulerError::Backend(e.to_string()))?;
        file.sync_all()
            .map_err(|e| SchedulerError::Backend(e.to_string()))?;
        fs::rename(&tmp_path, &file_path).map_err(|e| SchedulerError::Backend(e.to_string()))
    }
}

impl DurableStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, SchedulerError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: Value) -> Result<(), SchedulerError> {
        self.entries.insert(key.to_owned(), value);
        self.dirty = true;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool, SchedulerError> {
        let existed = self.entries.remove(key).is_some();
        self.dirty |= existed;
        Ok(existed)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn flush(&mut self) -> Result<(), SchedulerError> {
        if !self.dirty {
            return Ok(());
        }
        self.rewrite_disk()?;
        self.dirty = false;
        Ok(())
    }
}
