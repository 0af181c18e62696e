//! Contract tests for both count store backends
//!
//! Every behavioral test runs against `MemoryStore` and `JsonFileStore`
//! through the `ParticipantStore` trait, so the backends cannot drift apart.
//! File-format and durability specifics get json-only tests below.

use std::sync::Arc;
use std::thread;

use tallyboard::store::{CountMap, JsonFileStore, MemoryStore, ParticipantStore};
use tempfile::TempDir;

fn both_backends(dir: &TempDir) -> Vec<(&'static str, Box<dyn ParticipantStore>)> {
    vec![
        ("memory", Box::new(MemoryStore::new())),
        (
            "json",
            Box::new(JsonFileStore::new(dir.path().join("data.json"))),
        ),
    ]
}

#[test]
fn test_ensure_participant_starts_at_zero_and_keeps_existing() {
    let dir = tempfile::tempdir().unwrap();
    for (label, store) in both_backends(&dir) {
        store.ensure_participant("alice");
        assert_eq!(store.get_count("alice"), 0, "{label}");

        store.increment("alice");
        store.ensure_participant("alice");
        assert_eq!(store.get_count("alice"), 1, "{label}: ensure must not reset");
    }
}

#[test]
fn test_k_increments_read_back_k() {
    let dir = tempfile::tempdir().unwrap();
    for (label, store) in both_backends(&dir) {
        for expected in 1..=5u64 {
            assert_eq!(store.increment("bob"), expected, "{label}");
        }
        assert_eq!(store.get_count("bob"), 5, "{label}");
    }
}

#[test]
fn test_decrement_floors_at_zero() {
    let dir = tempfile::tempdir().unwrap();
    for (label, store) in both_backends(&dir) {
        assert_eq!(store.decrement("carol"), 0, "{label}: fresh name");
        store.increment("carol");
        store.increment("carol");
        assert_eq!(store.decrement("carol"), 1, "{label}");
        assert_eq!(store.decrement("carol"), 0, "{label}");
        assert_eq!(store.decrement("carol"), 0, "{label}: below zero");
    }
}

#[test]
fn test_get_count_unknown_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    for (label, store) in both_backends(&dir) {
        assert_eq!(store.get_count("ghost"), 0, "{label}");
        assert!(store.load().is_empty(), "{label}: lookup must not insert");
    }
}

#[test]
fn test_list_sorted_desc_with_name_order_ties() {
    let dir = tempfile::tempdir().unwrap();
    for (label, store) in both_backends(&dir) {
        for _ in 0..5 {
            store.increment("carol");
        }
        for _ in 0..3 {
            store.increment("alice");
        }
        for _ in 0..5 {
            store.increment("bob");
        }

        let names: Vec<String> = store.list_sorted().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["bob", "carol", "alice"], "{label}");
    }
}

#[test]
fn test_save_then_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    for (label, store) in both_backends(&dir) {
        let mut map = CountMap::new();
        map.insert("alice".to_string(), 3);
        map.insert("bob".to_string(), 7);
        store.save(&map);
        assert_eq!(store.load(), map, "{label}");
    }
}

fn hammer(store: Arc<dyn ParticipantStore>) {
    let mut handles = Vec::new();
    for _ in 0..4 {
        let store = store.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..25 {
                store.increment("alice");
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(store.get_count("alice"), 100, "updates were lost");
}

#[test]
fn test_concurrent_increments_memory() {
    hammer(Arc::new(MemoryStore::new()));
}

#[test]
fn test_concurrent_increments_json() {
    let dir = tempfile::tempdir().unwrap();
    hammer(Arc::new(JsonFileStore::new(dir.path().join("data.json"))));
}

// --- json backend specifics ---

#[test]
fn test_json_missing_file_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("absent.json"));
    assert!(store.load().is_empty());
    assert_eq!(store.get_count("anyone"), 0);
}

#[test]
fn test_json_corrupt_file_reads_empty_and_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(&path, "{not json!").unwrap();

    let store = JsonFileStore::new(path.clone());
    assert!(store.load().is_empty());

    // the first write replaces the corrupt document
    assert_eq!(store.increment("alice"), 1);
    let content = std::fs::read_to_string(&path).unwrap();
    let parsed: CountMap = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed.get("alice"), Some(&1));
}

#[test]
fn test_json_two_instances_share_one_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let a = JsonFileStore::new(path.clone());
    let b = JsonFileStore::new(path);

    a.increment("alice");
    assert_eq!(b.get_count("alice"), 1);
    b.increment("alice");
    assert_eq!(a.get_count("alice"), 2);
}

#[test]
fn test_json_document_is_pretty_printed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let store = JsonFileStore::new(path.clone());
    store.increment("alice");

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("\"alice\": 1"));
    assert!(content.contains('\n'), "document should be indented");
}

#[test]
fn test_memory_save_replaces_live_state() {
    let store = MemoryStore::new();
    store.increment("old");

    let mut map = CountMap::new();
    map.insert("new".to_string(), 9);
    store.save(&map);

    assert_eq!(store.get_count("old"), 0);
    assert_eq!(store.get_count("new"), 9);
    assert_eq!(store.load(), map);
}
