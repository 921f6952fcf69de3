//! Tests for durable stores

use colony_kernel::infra::store::{load_typed, save_typed};
use colony_kernel::infra::{DurableStore, FileStore, InMemoryStore};
use serde_json::json;

#[test]
fn test_in_memory_store_crud() {
    let mut store = InMemoryStore::new();
    store.put("behavior:a", json!({"phase": 1})).unwrap();
    assert_eq!(store.get("behavior:a").unwrap(), Some(json!({"phase": 1})));
    assert!(store.delete("behavior:a").unwrap());
    assert!(!store.delete("behavior:a").unwrap());
    assert!(store.is_empty());
}

#[test]
fn test_file_store_persists_only_after_flush() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut store = FileStore::open(dir.path(), "colony").unwrap();
        store.put("timeline:spawn1", json!({"tick": 4})).unwrap();
        store.flush().unwrap();
        store.put("timeline:spawn2", json!({"tick": 9})).unwrap();
    }
    let store = FileStore::open(dir.path(), "colony").unwrap();
    assert_eq!(store.get("timeline:spawn1").unwrap(), Some(json!({"tick": 4})));
    assert!(store.get("timeline:spawn2").unwrap().is_none());
    assert!(store.file_path().ends_with("colony.json"));
}

#[test]
fn test_file_store_prefix_scan_and_typed_access() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::open(dir.path(), "colony").unwrap();
    save_typed(&mut store, "behavior:b", &vec![1_u32, 2]).unwrap();
    save_typed(&mut store, "behavior:a", &vec![3_u32]).unwrap();
    save_typed(&mut store, "timeline:s", &0_u32).unwrap();

    assert_eq!(
        store.keys_with_prefix("behavior:"),
        vec!["behavior:a".to_string(), "behavior:b".to_string()]
    );
    let b: Option<Vec<u32>> = load_typed(&store, "behavior:b").unwrap();
    assert_eq!(b, Some(vec![1, 2]));
    let missing: Option<u32> = load_typed(&store, "behavior:zzz").unwrap();
    assert!(missing.is_none());
}

#[test]
fn test_corrupt_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("colony.json"), "{oops").unwrap();
    assert!(FileStore::open(dir.path(), "colony").is_err());
}
