//! Notes endpoints.
//!
//! Thin handlers over the injected [`NoteStore`]: validate, call the store,
//! map an absent note to 404.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use notes_store::NoteStore;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ErrorResponse, Result, ServerError};
use crate::state::AppState;
use crate::validation::{JsonObject, validate_create, validate_update};

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// A note as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier of the note.
    pub id: String,
    /// Title of the note.
    pub title: String,
    /// Content/body of the note.
    pub content: String,
    /// Creation time (ISO-8601, UTC).
    #[schema(format = DateTime)]
    pub created_at: String,
    /// Last update time (ISO-8601, UTC).
    #[schema(format = DateTime)]
    pub updated_at: String,
}

impl From<notes_store::Note> for Note {
    fn from(note: notes_store::Note) -> Self {
        Self {
            created_at: notes_store::format_timestamp(&note.created_at),
            updated_at: notes_store::format_timestamp(&note.updated_at),
            id: note.id,
            title: note.title,
            content: note.content,
        }
    }
}

/// Request to create a note.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateNoteRequest {
    /// Title, must contain non-whitespace characters.
    pub title: String,
    /// Content, may be empty.
    pub content: String,
}

/// Request to update a note. At least one field is required.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateNoteRequest {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New content.
    #[serde(default)]
    pub content: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Run a store call off the async runtime.
///
/// Mutations write the notes file while holding the store lock, so reads
/// may wait behind them too.
async fn with_store<T, F>(state: &AppState, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&NoteStore) -> T + Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || f(&store))
        .await
        .map_err(|e| ServerError::Internal(format!("Store task failed: {}", e)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/notes - List all notes.
#[utoipa::path(
    get,
    path = "/api/notes",
    responses(
        (status = 200, description = "Array of notes", body = [Note]),
    ),
    tag = "notes"
)]
pub async fn list_notes_handler(State(state): State<AppState>) -> Result<Json<Vec<Note>>> {
    let notes = with_store(&state, |store| store.list()).await?;
    Ok(Json(notes.into_iter().map(Note::from).collect()))
}

/// POST /api/notes - Create a new note.
#[utoipa::path(
    post,
    path = "/api/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created", body = Note),
        (status = 400, description = "Validation error", body = ErrorResponse),
    ),
    tag = "notes"
)]
pub async fn create_note_handler(
    State(state): State<AppState>,
    JsonObject(body): JsonObject,
) -> Result<(StatusCode, Json<Note>)> {
    let payload = validate_create(&body)?;
    let note = with_store(&state, move |store| store.create(payload)).await?;

    Ok((StatusCode::CREATED, Json(note.into())))
}

/// GET /api/notes/{id} - Get a note by ID.
#[utoipa::path(
    get,
    path = "/api/notes/{id}",
    params(
        ("id" = String, Path, description = "The note ID"),
    ),
    responses(
        (status = 200, description = "The requested note", body = Note),
        (status = 404, description = "Note not found", body = ErrorResponse),
    ),
    tag = "notes"
)]
pub async fn get_note_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Note>> {
    with_store(&state, move |store| store.get(&id))
        .await?
        .map(|note| Json(note.into()))
        .ok_or_else(ServerError::note_not_found)
}

/// PUT /api/notes/{id} - Update a note by ID.
#[utoipa::path(
    put,
    path = "/api/notes/{id}",
    params(
        ("id" = String, Path, description = "The note ID"),
    ),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "The updated note", body = Note),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Note not found", body = ErrorResponse),
    ),
    tag = "notes"
)]
pub async fn update_note_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonObject(body): JsonObject,
) -> Result<Json<Note>> {
    let changes = validate_update(&body)?;
    let updated = with_store(&state, move |store| store.update(&id, changes)).await?;

    updated
        .map(|note| Json(note.into()))
        .ok_or_else(ServerError::note_not_found)
}

/// DELETE /api/notes/{id} - Delete a note by ID.
#[utoipa::path(
    delete,
    path = "/api/notes/{id}",
    params(
        ("id" = String, Path, description = "The note ID"),
    ),
    responses(
        (status = 204, description = "Note deleted"),
        (status = 404, description = "Note not found", body = ErrorResponse),
    ),
    tag = "notes"
)]
pub async fn delete_note_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    if with_store(&state, move |store| store.delete(&id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::note_not_found())
    }
}

/// Create the notes router, mounted under `/api/notes`.
pub fn notes_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notes_handler).post(create_note_handler))
        .route(
            "/{id}",
            get(get_note_handler)
                .put(update_note_handler)
                .delete(delete_note_handler),
        )
}
