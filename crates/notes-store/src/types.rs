//! Note records and the payloads used to create and change them.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// A stored note.
///
/// Field names are camelCase on disk and on the wire; they are part of the
/// durable format and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique, immutable identifier.
    pub id: String,
    /// Non-empty title.
    pub title: String,
    /// Body text, may be empty.
    pub content: String,
    /// Creation time, never changes.
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub(crate) fn new(id: String, payload: NewNote, at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: payload.title,
            content: payload.content,
            created_at: at,
            updated_at: at,
        }
    }

    /// Apply `changes` and bump `updated_at`.
    ///
    /// The new timestamp is at least one millisecond after the previous one,
    /// so `updated_at` strictly increases even when two writes land in the
    /// same clock tick.
    pub(crate) fn apply(&mut self, changes: NoteChanges, at: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(content) = changes.content {
            self.content = content;
        }
        let floor = self.updated_at + chrono::Duration::milliseconds(1);
        self.updated_at = at.max(floor);
    }
}

/// Payload for creating a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNote {
    pub title: String,
    pub content: String,
}

impl NewNote {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Partial update. `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl NoteChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// Current time truncated to the millisecond precision used on disk.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Format a timestamp the way notes are persisted: `2024-05-01T12:00:00.000Z`.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
