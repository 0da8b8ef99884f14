//! Note domain model.
//!
//! # Responsibility
//! - Define the server-owned `Note` record mirrored by the client.
//! - Define the editable `NoteDraft` and the validated `NotePayload` wire body.
//!
//! # Invariants
//! - `Note::id` is assigned by the server and never changes.
//! - `NotePayload` only exists for drafts that passed local validation.
//! - Editable due dates use `YYYY-MM-DDTHH:MM` in UTC.

use crate::model::validation::{FieldErrors, FIELD_DESCRIPTION, FIELD_DUE_DATE, FIELD_TITLE};
use chrono::{DateTime, NaiveDateTime, ParseError, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Format of the editable due-date text (HTML `datetime-local` shape).
pub const EDITABLE_DUE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Opaque server-assigned note identifier.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NoteId = String;

/// Closed set of note lifecycle states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteStatus {
    /// Created but not started.
    #[default]
    Pending,
    /// Work is in progress.
    InProgress,
    /// Finished.
    Completed,
}

impl NoteStatus {
    /// Wire/display name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }
}

impl Display for NoteStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl Display for UnknownStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown note status `{}`; expected pending|in-progress|completed",
            self.0
        )
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for NoteStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "in-progress" | "in_progress" | "inprogress" => Ok(Self::InProgress),
            "completed" | "done" => Ok(Self::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Server-owned note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Serialized as `_id` to match the server's document naming.
    #[serde(rename = "_id", alias = "id")]
    pub id: NoteId,
    pub title: String,
    pub description: String,
    /// Comma-separated labels. Missing or `null` on the wire means empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: NoteStatus,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Note {
    /// Returns the individual tag labels, trimmed, without empty entries.
    pub fn tag_list(&self) -> Vec<&str> {
        split_tags(&self.tags)
    }

    /// Replaces every editable field with the payload values.
    ///
    /// `id` is left untouched.
    pub fn apply(&mut self, payload: &NotePayload) {
        self.title = payload.title.clone();
        self.description = payload.description.clone();
        self.tags = payload.tags.clone();
        self.due_date = payload.due_date;
        self.status = payload.status;
    }

    /// Builds an editable draft from this note.
    pub fn to_draft(&self) -> NoteDraft {
        NoteDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
            due_date: self.due_date.map(format_editable_due_date).unwrap_or_default(),
            status: self.status,
        }
    }
}

/// Editable, not-yet-confirmed copy of a note's fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub description: String,
    pub tags: String,
    /// Editable due-date text; empty means "no due date".
    pub due_date: String,
    pub status: NoteStatus,
}

impl NoteDraft {
    /// Creates a draft with the two required fields and default status.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Validates required fields and converts the draft into a wire payload.
    ///
    /// # Errors
    /// - `title` / `description` empty after trimming.
    /// - `dueDate` non-empty but not parseable.
    pub fn validate(&self) -> Result<NotePayload, FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.title.trim().is_empty() {
            errors.push(FIELD_TITLE, "Title is required.");
        }
        if self.description.trim().is_empty() {
            errors.push(FIELD_DESCRIPTION, "Description is required.");
        }

        let due_date = match parse_editable_due_date(&self.due_date) {
            Ok(value) => value,
            Err(_) => {
                errors.push(FIELD_DUE_DATE, "Due date is invalid.");
                None
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NotePayload {
            title: self.title.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
            due_date,
            status: self.status,
        })
    }
}

/// Validated create/edit request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePayload {
    pub title: String,
    pub description: String,
    pub tags: String,
    /// Serialized as `null` when unset so edits can clear the due date.
    #[serde(serialize_with = "serialize_due_date")]
    pub due_date: Option<DateTime<Utc>>,
    pub status: NoteStatus,
}

fn serialize_due_date<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(at) => serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        None => serializer.serialize_none(),
    }
}

/// Splits a comma-separated tag string into trimmed, non-empty labels.
pub fn split_tags(tags: &str) -> Vec<&str> {
    tags.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Formats a due date into its editable representation.
pub fn format_editable_due_date(at: DateTime<Utc>) -> String {
    at.format(EDITABLE_DUE_DATE_FORMAT).to_string()
}

/// Parses editable due-date text.
///
/// Accepts the editable form and full RFC 3339 timestamps. Blank input means
/// no due date.
pub fn parse_editable_due_date(value: &str) -> Result<Option<DateTime<Utc>>, ParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, EDITABLE_DUE_DATE_FORMAT) {
        return Ok(Some(naive.and_utc()));
    }

    DateTime::parse_from_rfc3339(trimmed).map(|at| Some(at.with_timezone(&Utc)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_note() -> Note {
        Note {
            id: "abc".to_string(),
            title: "Groceries".to_string(),
            description: "milk, eggs".to_string(),
            tags: " home, ,errands ".to_string(),
            due_date: Some(Utc.with_ymd_and_hms(2025, 3, 4, 9, 30, 45).unwrap()),
            status: NoteStatus::InProgress,
        }
    }

    #[test]
    fn note_deserializes_server_shape_with_defaults() {
        let note: Note = serde_json::from_str(
            r#"{"_id":"66a1","title":"t","description":"d","createdAt":"2025-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(note.id, "66a1");
        assert_eq!(note.tags, "");
        assert_eq!(note.due_date, None);
        assert_eq!(note.status, NoteStatus::Pending);
    }

    #[test]
    fn note_accepts_null_due_date_and_kebab_status() {
        let note: Note = serde_json::from_str(
            r#"{"id":"1","title":"t","description":"d","dueDate":null,"status":"in-progress"}"#,
        )
        .unwrap();
        assert_eq!(note.due_date, None);
        assert_eq!(note.status, NoteStatus::InProgress);
    }

    #[test]
    fn note_treats_null_tags_and_status_as_defaults() {
        let note: Note = serde_json::from_str(
            r#"{"_id":"a","title":"t","description":"d","tags":null,"status":null}"#,
        )
        .unwrap();
        assert_eq!(note.tags, "");
        assert_eq!(note.status, NoteStatus::Pending);
    }

    #[test]
    fn tag_list_drops_blank_entries() {
        assert_eq!(sample_note().tag_list(), vec!["home", "errands"]);
    }

    #[test]
    fn to_draft_normalizes_due_date_to_minutes() {
        let draft = sample_note().to_draft();
        assert_eq!(draft.due_date, "2025-03-04T09:30");
        assert_eq!(draft.status, NoteStatus::InProgress);
    }

    #[test]
    fn validate_rejects_whitespace_required_fields() {
        let errors = NoteDraft::new("   ", "\t").validate().unwrap_err();
        assert_eq!(errors.get(FIELD_TITLE), Some(&["Title is required.".to_string()][..]));
        assert_eq!(
            errors.get(FIELD_DESCRIPTION),
            Some(&["Description is required.".to_string()][..])
        );
    }

    #[test]
    fn validate_rejects_unparseable_due_date() {
        let mut draft = NoteDraft::new("t", "d");
        draft.due_date = "next tuesday".to_string();
        let errors = draft.validate().unwrap_err();
        assert!(errors.get(FIELD_DUE_DATE).is_some());
        assert!(errors.get(FIELD_TITLE).is_none());
    }

    #[test]
    fn payload_serializes_wire_names() {
        let mut draft = NoteDraft::new("t", "d");
        draft.due_date = "2025-03-04T09:30".to_string();
        draft.status = NoteStatus::Completed;
        let value = serde_json::to_value(draft.validate().unwrap()).unwrap();
        assert_eq!(value["dueDate"], "2025-03-04T09:30:00.000Z");
        assert_eq!(value["status"], "completed");

        let cleared = serde_json::to_value(NoteDraft::new("t", "d").validate().unwrap()).unwrap();
        assert!(cleared["dueDate"].is_null());
    }

    #[test]
    fn apply_keeps_id() {
        let mut note = sample_note();
        let payload = NoteDraft::new("new", "body").validate().unwrap();
        note.apply(&payload);
        assert_eq!(note.id, "abc");
        assert_eq!(note.title, "new");
        assert_eq!(note.due_date, None);
        assert_eq!(note.status, NoteStatus::Pending);
    }

    #[test]
    fn status_parses_aliases() {
        assert_eq!("In_Progress".parse::<NoteStatus>().unwrap(), NoteStatus::InProgress);
        assert!("archived".parse::<NoteStatus>().is_err());
    }
}
