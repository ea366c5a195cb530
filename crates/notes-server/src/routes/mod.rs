//! API routes.

pub mod health;
pub mod notes;
pub mod openapi;

pub use health::{HealthResponse, RootResponse, health_routes};
pub use notes::{
    CreateNoteRequest, Note, UpdateNoteRequest, create_note_handler, delete_note_handler,
    get_note_handler, list_notes_handler, notes_routes, update_note_handler,
};
pub use openapi::{ApiDoc, swagger_ui};
