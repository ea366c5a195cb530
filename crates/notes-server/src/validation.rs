//! Request body parsing and validation for note payloads.
//!
//! Bodies are inspected as raw JSON so that a wrong type produces a field
//! message instead of a deserializer error. An empty body, a body that is
//! not a JSON object, and a request without a JSON content type all count
//! as `{}`.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{HeaderMap, StatusCode, header},
};
use notes_store::{NewNote, NoteChanges};
use serde_json::{Map, Value};

use crate::error::{Result, ServerError};

/// Extractor for a note payload as a JSON object.
pub struct JsonObject(pub Map<String, Value>);

impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        if !has_json_content_type(req.headers()) {
            return Ok(Self(Map::new()));
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ServerError::PayloadTooLarge
            } else {
                ServerError::BadRequest(rejection.body_text())
            }
        })?;

        parse_object(&bytes).map(Self)
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Parse a JSON body into an object. Blank and non-object bodies are `{}`.
pub fn parse_object(bytes: &[u8]) -> Result<Map<String, Value>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Ok(Map::new()),
        Err(e) => Err(ServerError::BadRequest(format!(
            "Failed to parse the request body as JSON: {}",
            e
        ))),
    }
}

fn non_blank(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}

/// Validate a create payload: non-blank `title` and string `content`.
pub fn validate_create(body: &Map<String, Value>) -> Result<NewNote> {
    let title = body.get("title").and_then(non_blank);
    let content = body.get("content").and_then(Value::as_str);

    let mut errors = Vec::new();
    if title.is_none() {
        errors.push("title is required and must be a non-empty string".to_string());
    }
    if content.is_none() {
        errors.push("content is required and must be a string".to_string());
    }

    match (title, content) {
        (Some(title), Some(content)) => Ok(NewNote::new(title, content)),
        _ => Err(ServerError::Validation(errors)),
    }
}

/// Validate an update payload: each provided field is checked and at least
/// one of them must be present. Unknown fields are ignored.
pub fn validate_update(body: &Map<String, Value>) -> Result<NoteChanges> {
    let mut errors = Vec::new();
    let mut changes = NoteChanges::new();

    if let Some(value) = body.get("title") {
        match non_blank(value) {
            Some(title) => changes.title = Some(title.to_string()),
            None => errors.push("title must be a non-empty string when provided".to_string()),
        }
    }
    if let Some(value) = body.get("content") {
        match value.as_str() {
            Some(content) => changes.content = Some(content.to_string()),
            None => errors.push("content must be a string when provided".to_string()),
        }
    }
    if !body.contains_key("title") && !body.contains_key("content") {
        errors.push("at least one of title or content must be provided".to_string());
    }

    if errors.is_empty() {
        Ok(changes)
    } else {
        Err(ServerError::Validation(errors))
    }
}
