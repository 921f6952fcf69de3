//! Infrastructure adapters for durable storage backends.

pub mod store;

pub use store::{DurableStore, FileStore, InMemoryStore};
