//! The note store: ordered in-memory collection mirrored to a JSON file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::{Result, StoreError};
use crate::id::generate_id;
use crate::types::{NewNote, Note, NoteChanges, now};

/// Notes in insertion order plus an id → position index.
#[derive(Debug, Default)]
struct Notes {
    items: Vec<Note>,
    index: HashMap<String, usize>,
}

impl Notes {
    fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    fn get(&self, id: &str) -> Option<&Note> {
        self.index.get(id).map(|&pos| &self.items[pos])
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Note> {
        self.index.get(id).map(|&pos| &mut self.items[pos])
    }

    /// Insert or replace. A replaced note keeps its original position.
    fn upsert(&mut self, note: Note) {
        match self.index.get(&note.id) {
            Some(&pos) => self.items[pos] = note,
            None => {
                self.index.insert(note.id.clone(), self.items.len());
                self.items.push(note);
            }
        }
    }

    fn remove(&mut self, id: &str) -> Option<Note> {
        let pos = self.index.remove(id)?;
        let note = self.items.remove(pos);
        for later in &self.items[pos..] {
            if let Some(slot) = self.index.get_mut(&later.id) {
                *slot -= 1;
            }
        }
        Some(note)
    }
}

/// Thread-safe note store.
///
/// Each mutating call holds the lock across modify and persist, so
/// concurrent requests cannot interleave writes to the file.
#[derive(Debug)]
pub struct NoteStore {
    path: Option<PathBuf>,
    notes: Mutex<Notes>,
}

impl NoteStore {
    /// Open a store backed by `path`, loading any notes already there.
    ///
    /// Never fails: a missing file means an empty store, and an unreadable
    /// or malformed file is logged and treated the same way.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let notes = match load_notes(&path) {
            Ok(Some(notes)) => {
                info!(path = %path.display(), count = notes.items.len(), "Loaded notes");
                notes
            }
            Ok(None) => {
                debug!(path = %path.display(), "No notes file, starting empty");
                Notes::default()
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to load notes from disk");
                Notes::default()
            }
        };

        Self {
            path: Some(path),
            notes: Mutex::new(notes),
        }
    }

    /// A store with no backing file. Mutations are never persisted.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            notes: Mutex::new(Notes::default()),
        }
    }

    /// Path of the persistence file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.notes.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.lock().items.is_empty()
    }

    /// Create a note with a fresh id and persist.
    pub fn create(&self, payload: NewNote) -> Note {
        let mut notes = self.notes.lock();
        let at = now();
        let id = generate_id(at, |candidate| notes.contains(candidate));
        let note = Note::new(id, payload, at);

        notes.upsert(note.clone());
        debug!(id = %note.id, "Created note");
        self.save_logged(&notes);
        note
    }

    /// All notes in insertion order.
    pub fn list(&self) -> Vec<Note> {
        self.notes.lock().items.clone()
    }

    pub fn get(&self, id: &str) -> Option<Note> {
        self.notes.lock().get(id).cloned()
    }

    /// Apply `changes` to an existing note and persist.
    ///
    /// Returns `None` without touching anything when `id` is unknown.
    pub fn update(&self, id: &str, changes: NoteChanges) -> Option<Note> {
        let mut notes = self.notes.lock();
        let note = notes.get_mut(id)?;
        note.apply(changes, now());
        let updated = note.clone();

        debug!(id = %updated.id, "Updated note");
        self.save_logged(&notes);
        Some(updated)
    }

    /// Remove a note. Returns whether one was removed.
    pub fn delete(&self, id: &str) -> bool {
        let mut notes = self.notes.lock();
        if notes.remove(id).is_none() {
            return false;
        }

        debug!(id, "Deleted note");
        self.save_logged(&notes);
        true
    }

    /// Write the current collection to disk, surfacing any failure.
    pub fn persist(&self) -> Result<()> {
        let notes = self.notes.lock();
        self.save(&notes)
    }

    fn save_logged(&self, notes: &Notes) {
        if let Err(e) = self.save(notes) {
            error!(error = %e, "Failed to save notes to disk");
        }
    }

    fn save(&self, notes: &Notes) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let contents = serde_json::to_string_pretty(&notes.items)?;

        // Write beside the target, then rename over it.
        let tmp = tmp_path(path);
        fs::write(&tmp, contents).map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "notes.json".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

/// Read the notes file. `Ok(None)` when it does not exist.
fn load_notes(path: &Path) -> Result<Option<Notes>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    let value: Value = serde_json::from_str(&raw)?;
    let Value::Array(records) = value else {
        return Err(StoreError::InvalidFormat {
            path: path.to_path_buf(),
        });
    };

    let loaded_at = now();
    let mut notes = Notes::default();
    for (position, record) in records.into_iter().enumerate() {
        match note_from_record(&record, loaded_at) {
            Some((note, repaired)) => {
                if repaired {
                    warn!(position, id = %note.id, "Filled in missing or invalid fields of stored note");
                }
                notes.upsert(note);
            }
            None => warn!(position, "Skipping stored note without an id"),
        }
    }

    Ok(Some(notes))
}

/// Build a note from a stored record. Only a missing id rejects it.
///
/// Absent `title`/`content` become `""`, other non-string values keep their
/// JSON text, and unusable timestamps fall back to `loaded_at` (or to
/// `createdAt` for `updatedAt`). The flag reports whether anything was filled in.
fn note_from_record(record: &Value, loaded_at: DateTime<Utc>) -> Option<(Note, bool)> {
    let id = match record.get("id")? {
        Value::String(id) if !id.is_empty() => id.clone(),
        Value::Number(n) if n.as_f64() != Some(0.0) => n.to_string(),
        _ => return None,
    };

    let mut repaired = false;
    let mut text = |field: &str| match record.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => {
            repaired = true;
            String::new()
        }
        Some(other) => {
            repaired = true;
            other.to_string()
        }
    };
    let title = text("title");
    let content = text("content");

    let timestamp = |field: &str| {
        record
            .get(field)
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|at| at.with_timezone(&Utc))
    };
    let created_at = timestamp("createdAt");
    let updated_at = timestamp("updatedAt");
    repaired |= created_at.is_none() || updated_at.is_none();
    let created_at = created_at.unwrap_or(loaded_at);
    let updated_at = updated_at.unwrap_or(created_at);

    let note = Note {
        id,
        title,
        content,
        created_at,
        updated_at,
    };
    Some((note, repaired))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, NoteStore) {
        let dir = TempDir::new().unwrap();
        let store = NoteStore::open(dir.path().join("notes.json"));
        (dir, store)
    }

    #[test]
    fn test_create_then_get() {
        let (_dir, store) = temp_store();
        let note = store.create(NewNote::new("A", "B"));

        assert!(!note.id.is_empty());
        assert_eq!(note.title, "A");
        assert_eq!(note.content, "B");
        assert_eq!(note.created_at, note.updated_at);
        assert_eq!(store.get(&note.id), Some(note));
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let (_dir, store) = temp_store();
        let first = store.create(NewNote::new("first", ""));
        let second = store.create(NewNote::new("second", ""));
        let third = store.create(NewNote::new("third", ""));

        store.update(&first.id, NoteChanges::new().with_content("touched"));

        let ids: Vec<String> = store.list().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![first.id, second.id, third.id]);
    }

    #[test]
    fn test_update_unknown_id_is_absent() {
        let (dir, store) = temp_store();
        store.create(NewNote::new("keep", "me"));
        let before = std::fs::read_to_string(dir.path().join("notes.json")).unwrap();

        assert!(store.update("nope-0", NoteChanges::new().with_title("x")).is_none());
        assert_eq!(store.len(), 1);

        let after = std::fs::read_to_string(dir.path().join("notes.json")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_update_title_preserves_other_fields() {
        let (_dir, store) = temp_store();
        let note = store.create(NewNote::new("Old", "Body"));

        let updated = store
            .update(&note.id, NoteChanges::new().with_title("New"))
            .unwrap();

        assert_eq!(updated.id, note.id);
        assert_eq!(updated.title, "New");
        assert_eq!(updated.content, "Body");
        assert_eq!(updated.created_at, note.created_at);
        assert!(updated.updated_at > note.updated_at);
    }

    #[test]
    fn test_delete_twice() {
        let (_dir, store) = temp_store();
        let note = store.create(NewNote::new("gone", "soon"));
        store.create(NewNote::new("stays", ""));

        assert!(store.delete(&note.id));
        assert!(!store.delete(&note.id));
        assert_eq!(store.len(), 1);
        assert!(store.get(&note.id).is_none());
    }

    #[test]
    fn test_delete_reindexes_later_notes() {
        let (_dir, store) = temp_store();
        let a = store.create(NewNote::new("a", ""));
        let b = store.create(NewNote::new("b", ""));
        let c = store.create(NewNote::new("c", ""));

        assert!(store.delete(&a.id));
        assert_eq!(store.get(&b.id).unwrap().title, "b");
        assert_eq!(store.get(&c.id).unwrap().title, "c");

        let updated = store
            .update(&c.id, NoteChanges::new().with_title("c2"))
            .unwrap();
        assert_eq!(updated.title, "c2");
        assert_eq!(store.get(&b.id).unwrap().title, "b");
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = NoteStore::open(dir.path().join("absent.json"));
        assert!(store.is_empty());
        assert!(!dir.path().join("absent.json").exists());
    }

    #[test]
    fn test_open_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = NoteStore::open(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn test_open_non_array_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(&path, r#"{"id": "a-0"}"#).unwrap();

        let store = NoteStore::open(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_skips_records_without_id() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(
            &path,
            r#"[
                {"id": "a-0", "title": "kept", "content": "", "createdAt": "2024-05-01T12:00:00.000Z", "updatedAt": "2024-05-01T12:00:00.000Z"},
                {"title": "no id", "content": "", "createdAt": "2024-05-01T12:00:00.000Z", "updatedAt": "2024-05-01T12:00:00.000Z"},
                {"id": "", "title": "empty id", "content": "", "createdAt": "2024-05-01T12:00:00.000Z", "updatedAt": "2024-05-01T12:00:00.000Z"},
                null,
                {"id": 0, "title": "falsy id"}
            ]"#,
        )
        .unwrap();

        let store = NoteStore::open(&path);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a-0").unwrap().title, "kept");
    }

    #[test]
    fn test_load_keeps_incomplete_records_across_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(
            &path,
            r#"[
                {"id": "legacy-0", "title": "old", "createdAt": "2024-05-01T12:00:00.000Z", "updatedAt": "2024-05-01T12:30:00.000Z"},
                {"id": "legacy-1", "content": "no title", "createdAt": "garbage"},
                {"id": "legacy-2", "title": 42, "content": null}
            ]"#,
        )
        .unwrap();

        let store = NoteStore::open(&path);
        assert_eq!(store.len(), 3);

        store.create(NewNote::new("fresh", ""));

        let raw = std::fs::read_to_string(&path).unwrap();
        let on_disk: Vec<Note> = serde_json::from_str(&raw).unwrap();
        let ids: Vec<&str> = on_disk.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(&ids[..3], &["legacy-0", "legacy-1", "legacy-2"]);
        assert_eq!(on_disk.len(), 4);

        let legacy = &on_disk[0];
        assert_eq!(legacy.title, "old");
        assert_eq!(legacy.content, "");
        assert_eq!(
            crate::format_timestamp(&legacy.created_at),
            "2024-05-01T12:00:00.000Z"
        );
        assert_eq!(
            crate::format_timestamp(&legacy.updated_at),
            "2024-05-01T12:30:00.000Z"
        );

        assert_eq!(on_disk[1].title, "");
        assert_eq!(on_disk[1].created_at, on_disk[1].updated_at);
        assert_eq!(on_disk[2].title, "42");
        assert_eq!(on_disk[2].content, "");
    }

    #[test]
    fn test_load_accepts_numeric_id() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(&path, r#"[{"id": 17, "title": "n", "content": "c"}]"#).unwrap();

        let store = NoteStore::open(&path);
        assert_eq!(store.get("17").unwrap().content, "c");
    }

    #[test]
    fn test_load_duplicate_id_keeps_first_position() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(
            &path,
            r#"[
                {"id": "a-0", "title": "old", "content": "", "createdAt": "2024-05-01T12:00:00.000Z", "updatedAt": "2024-05-01T12:00:00.000Z"},
                {"id": "b-0", "title": "b", "content": "", "createdAt": "2024-05-01T12:00:00.000Z", "updatedAt": "2024-05-01T12:00:00.000Z"},
                {"id": "a-0", "title": "new", "content": "", "createdAt": "2024-05-01T12:00:00.000Z", "updatedAt": "2024-05-01T12:00:01.000Z"}
            ]"#,
        )
        .unwrap();

        let store = NoteStore::open(&path);
        let titles: Vec<String> = store.list().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["new", "b"]);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("notes.json");
        let store = NoteStore::open(&path);

        store.create(NewNote::new("t", "c"));

        assert!(path.exists());
        assert!(!dir.path().join("nested/deeper/.notes.json.tmp").exists());
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "a file, not a directory").unwrap();
        let store = NoteStore::open(blocker.join("notes.json"));

        let note = store.create(NewNote::new("still", "here"));

        assert_eq!(store.get(&note.id), Some(note));
        assert!(store.persist().is_err());
    }

    #[test]
    fn test_delete_absent_does_not_write() {
        let (dir, store) = temp_store();
        assert!(!store.delete("missing-0"));
        assert!(!dir.path().join("notes.json").exists());
    }

    #[test]
    fn test_in_memory_store() {
        let store = NoteStore::in_memory();
        let note = store.create(NewNote::new("t", "c"));
        assert!(store.path().is_none());
        assert_eq!(store.list(), vec![note]);
        assert!(store.persist().is_ok());
    }

    #[test]
    fn test_persist_writes_camel_case_array() {
        let (dir, store) = temp_store();
        let note = store.create(NewNote::new("t", "c"));

        let raw = std::fs::read_to_string(dir.path().join("notes.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let records = value.as_array().unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"], note.id.as_str());
        assert!(records[0].get("createdAt").is_some());
        assert!(records[0].get("updatedAt").is_some());
    }
}
