//! Behavioural tests for the note store across restarts and heavy use.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use notes_store::{NewNote, NoteChanges, NoteStore};
use tempfile::TempDir;

#[test]
fn test_restart_durability() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.json");

    let before = {
        let store = NoteStore::open(&path);
        for i in 0..25 {
            store.create(NewNote::new(format!("note {}", i), format!("body {}", i)));
        }
        let third = store.list()[3].id.clone();
        store.update(&third, NoteChanges::new().with_title("renamed"));
        let fifth = store.list()[5].id.clone();
        assert!(store.delete(&fifth));
        store.list()
    };

    let reopened = NoteStore::open(&path);
    assert_eq!(reopened.list(), before);
    assert_eq!(reopened.len(), 24);
}

#[test]
fn test_ids_unique_under_rapid_creation() {
    let store = NoteStore::in_memory();
    let ids: HashSet<String> = (0..1000)
        .map(|i| store.create(NewNote::new(format!("n{}", i), "")).id)
        .collect();

    assert_eq!(ids.len(), 1000);
}

#[test]
fn test_ids_stay_unique_after_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.json");

    let first: HashSet<String> = {
        let store = NoteStore::open(&path);
        (0..50).map(|_| store.create(NewNote::new("t", "")).id).collect()
    };

    let store = NoteStore::open(&path);
    for _ in 0..50 {
        let note = store.create(NewNote::new("t", ""));
        assert!(!first.contains(&note.id));
    }
    assert_eq!(store.len(), 100);
}

#[test]
fn test_create_update_delete_scenario() {
    let dir = TempDir::new().unwrap();
    let store = NoteStore::open(dir.path().join("notes.json"));

    let created = store.create(NewNote::new("A", "B"));
    assert!(!created.id.is_empty());
    assert_eq!(created.title, "A");
    assert_eq!(created.content, "B");
    assert_eq!(created.created_at, created.updated_at);

    assert_eq!(store.list(), vec![created.clone()]);

    let updated = store
        .update(&created.id, NoteChanges::new().with_content("C"))
        .unwrap();
    assert_eq!(updated.title, "A");
    assert_eq!(updated.content, "C");
    assert!(updated.updated_at > updated.created_at);

    assert!(store.delete(&created.id));
    assert!(store.list().is_empty());
}

#[test]
fn test_concurrent_writers_do_not_lose_notes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.json");
    let store = Arc::new(NoteStore::open(&path));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..25 {
                    store.create(NewNote::new(format!("t{}-{}", t, i), ""));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 200);
    let ids: HashSet<String> = store.list().into_iter().map(|n| n.id).collect();
    assert_eq!(ids.len(), 200);

    let reopened = NoteStore::open(&path);
    assert_eq!(reopened.list(), store.list());
}

#[test]
fn test_independent_stores_do_not_share_state() {
    let dir = TempDir::new().unwrap();
    let a = NoteStore::open(dir.path().join("a.json"));
    let b = NoteStore::open(dir.path().join("b.json"));

    a.create(NewNote::new("only in a", ""));

    assert_eq!(a.len(), 1);
    assert!(b.is_empty());
}
