//! Durable key/value stores.
//!
//! Nothing held in memory by the kernel survives between process lifetimes; every
//! piece of state that must persist (behavior progress, timelines) goes through a
//! [`DurableStore`]. Values are JSON documents.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::InMemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::core::SchedulerError;

/// Abstraction for durable storage backends.
pub trait DurableStore {
    /// Fetch the document stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Value>, SchedulerError>;
    /// Store a document under `key`, replacing any previous one.
    fn put(&mut self, key: &str, value: Value) -> Result<(), SchedulerError>;
    /// Remove `key`. Returns whether it existed.
    fn delete(&mut self, key: &str) -> Result<bool, SchedulerError>;
    /// Every key starting with `prefix`, sorted.
    fn keys_with_prefix(&self, prefix: &str) -> Vec<String>;
    /// Make pending writes durable. In-memory stores have nothing to do.
    fn flush(&mut self) -> Result<(), SchedulerError> {
        Ok(())
    }
}

/// Typed read of a stored document.
pub fn load_typed<T: DeserializeOwned>(
    store: &dyn DurableStore,
    key: &str,
) -> Result<Option<T>, SchedulerError> {
    store
        .get(key)?
        .map(serde_json::from_value)
        .transpose()
        .map_err(SchedulerError::from)
}

/// Typed write of a document.
pub fn save_typed<T: Serialize>(
    store: &mut dyn DurableStore,
    key: &str,
    value: &T,
) -> Result<(), SchedulerError> {
    let value = serde_json::to_value(value)?;
    store.put(key, value)
}
