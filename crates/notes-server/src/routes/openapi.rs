//! OpenAPI documentation configuration.

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::{health, notes};
use crate::error::ErrorResponse;

/// OpenAPI documentation for the notes API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Notes API",
        description = "Create, list, fetch, update and delete short text notes",
        version = "1.0.0",
        license(name = "MIT"),
    ),
    servers(
        (url = "/", description = "Local server"),
    ),
    paths(
        // Health
        health::root,
        health::health,
        // Notes
        notes::list_notes_handler,
        notes::create_note_handler,
        notes::get_note_handler,
        notes::update_note_handler,
        notes::delete_note_handler,
    ),
    components(
        schemas(
            health::HealthResponse,
            health::RootResponse,
            notes::Note,
            notes::CreateNoteRequest,
            notes::UpdateNoteRequest,
            ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "notes", description = "Endpoints for managing notes"),
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router serving `/docs` and `/openapi.json`.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi())
}
