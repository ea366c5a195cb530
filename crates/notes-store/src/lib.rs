//! Note storage for the notes service.
//!
//! The store keeps every note in memory, in insertion order, and mirrors
//! each mutation to a single JSON file so that notes survive a restart.
//!
//! - Ids are compact base-36 timestamps with a collision counter
//!   (see [`id`]).
//! - Every mutation rewrites the whole file; a failed write is logged and
//!   the in-memory state stays authoritative.
//! - Not-found is a value (`None` / `false`), never an error.
//!
//! # Example
//!
//! ```no_run
//! use notes_store::{NewNote, NoteChanges, NoteStore};
//!
//! let store = NoteStore::open("data/notes.json");
//! let note = store.create(NewNote::new("Groceries", "eggs, milk"));
//!
//! let updated = store
//!     .update(&note.id, NoteChanges::new().with_content("eggs, milk, bread"))
//!     .expect("note exists");
//! assert_eq!(updated.title, "Groceries");
//!
//! assert!(store.delete(&note.id));
//! ```

pub mod error;
pub mod id;
pub mod store;
pub mod types;

pub use error::{Result, StoreError};
pub use id::{generate_id, to_base36};
pub use store::NoteStore;
pub use types::{NewNote, Note, NoteChanges, format_timestamp, now};
