//! Document wire shapes for notes and references.
//!
//! # Responsibility
//! - Define the single canonical document shape for each record type.
//! - Convert records to/from documents and their JSON text encoding.
//! - Project the metadata persisted next to each document.
//!
//! # Invariants
//! - JSON text is only ever produced by encoding a document struct.
//! - `date_created` is written as RFC 3339 UTC.
//! - Unknown `variant_kind` values decode to `NoteKind::Untyped`.
//! - Decoding rejects malformed ids, timestamps and statuses.

use crate::model::error::{ModelError, ModelResult};
use crate::model::note::{collect_tags, Note, NoteId, NoteKind, NoteStatus};
use crate::model::reference::{Reference, ReferenceDetails, ReferenceId, ReferenceKind};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Store-side metadata projection (JSON object).
pub type Metadata = serde_json::Map<String, Value>;

/// Persisted note document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDocument {
    pub id: String,
    pub title: String,
    pub text: String,
    pub parent_note_id: Option<String>,
    #[serde(default)]
    pub related_notes_ids: Vec<String>,
    pub date_created: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Older documents carry the discriminator as `type`.
    #[serde(alias = "type")]
    pub variant_kind: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
}

/// Persisted reference document. Owned notes are stored separately and
/// listed here by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDocument {
    pub id: String,
    pub kind: String,
    pub title: String,
    pub authors: String,
    pub year: i32,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub journal: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub pages: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub extra_fields: BTreeMap<String, String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub notes_ids: Vec<String>,
}

impl ReferenceDocument {
    /// Parses the ids of notes owned by this reference.
    pub fn note_ids(&self) -> ModelResult<Vec<NoteId>> {
        self.notes_ids
            .iter()
            .map(|value| parse_id("notes_ids", value))
            .collect()
    }
}

impl Note {
    /// Builds the canonical document for this note.
    pub fn to_document(&self) -> NoteDocument {
        NoteDocument {
            id: self.id.to_string(),
            title: self.title.clone(),
            text: self.text.clone(),
            parent_note_id: self.parent_id.map(|id| id.to_string()),
            related_notes_ids: self.related_ids.iter().map(Uuid::to_string).collect(),
            date_created: format_timestamp(self.date_created),
            tags: self.tags.clone(),
            variant_kind: self.variant_kind().to_string(),
            status: self.status.as_str().to_string(),
            reference_id: self.reference_id().map(|id| id.to_string()),
        }
    }

    /// Encodes `to_document()` as JSON text.
    pub fn to_json(&self) -> ModelResult<String> {
        Ok(serde_json::to_string(&self.to_document())?)
    }

    /// Rebuilds a note from a document, dispatching on `variant_kind`.
    pub fn from_document(document: NoteDocument) -> ModelResult<Self> {
        Self::try_from(document)
    }

    /// Decodes JSON text produced by `to_json`.
    pub fn from_json(text: &str) -> ModelResult<Self> {
        let document: NoteDocument = serde_json::from_str(text)?;
        Self::from_document(document)
    }

    /// Decodes either a structured document or its JSON text encoding.
    pub fn from_value(value: Value) -> ModelResult<Self> {
        match value {
            Value::String(text) => Self::from_json(&text),
            other => Self::from_document(serde_json::from_value(other)?),
        }
    }

    /// Metadata projection stored next to the document for filtering.
    pub fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert(
            "variant_kind".to_string(),
            Value::from(self.variant_kind()),
        );
        metadata.insert("tags".to_string(), Value::from(self.tags.clone()));
        metadata.insert(
            "date_created".to_string(),
            Value::from(format_timestamp(self.date_created)),
        );
        if let Some(reference_id) = self.reference_id() {
            metadata.insert(
                "reference_id".to_string(),
                Value::from(reference_id.to_string()),
            );
        }
        metadata
    }
}

impl From<&Note> for NoteDocument {
    fn from(value: &Note) -> Self {
        value.to_document()
    }
}

impl TryFrom<NoteDocument> for Note {
    type Error = ModelError;

    fn try_from(document: NoteDocument) -> Result<Self, Self::Error> {
        let id = parse_id("id", &document.id)?;
        let kind = match document.variant_kind.as_str() {
            "fleeting" => NoteKind::Fleeting,
            "permanent" => NoteKind::Permanent,
            "literature" => {
                let raw = document.reference_id.as_deref().ok_or_else(|| {
                    ModelError::Format(format!(
                        "literature note {id} is missing reference_id"
                    ))
                })?;
                NoteKind::Literature {
                    reference_id: parse_id("reference_id", raw)?,
                }
            }
            other => NoteKind::Untyped(other.to_string()),
        };
        let parent_id = document
            .parent_note_id
            .as_deref()
            .filter(|value| !value.is_empty())
            .map(|value| parse_id("parent_note_id", value))
            .transpose()?;
        let related_ids = document
            .related_notes_ids
            .iter()
            .map(|value| parse_id("related_notes_ids", value))
            .collect::<ModelResult<Vec<_>>>()?;
        let date_created = parse_timestamp(&document.date_created)?;
        let status = NoteStatus::parse(&document.status).ok_or_else(|| {
            ModelError::Format(format!("invalid status `{}`", document.status))
        })?;
        let tags = collect_tags(document.tags)?;

        let note = Note {
            id,
            kind,
            title: document.title,
            text: document.text,
            parent_id,
            related_ids,
            date_created,
            tags,
            status,
        };
        note.validate()?;
        Ok(note)
    }
}

impl Serialize for Note {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Note {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let document = NoteDocument::deserialize(deserializer)?;
        Note::try_from(document).map_err(serde::de::Error::custom)
    }
}

impl Reference {
    /// Builds the canonical document for this reference.
    pub fn to_document(&self) -> ReferenceDocument {
        let ReferenceDetails {
            url,
            publisher,
            journal,
            volume,
            number,
            pages,
            doi,
            isbn,
            extra_fields,
        } = self.details.clone();

        ReferenceDocument {
            id: self.id.to_string(),
            kind: self.kind.as_str().to_string(),
            title: self.title.clone(),
            authors: self.authors.clone(),
            year: self.year,
            url,
            publisher,
            journal,
            volume,
            number,
            pages,
            doi,
            isbn,
            extra_fields,
            summary: self.summary.clone(),
            notes_ids: self.notes.iter().map(|note| note.id().to_string()).collect(),
        }
    }

    /// Rebuilds a reference from its document and the notes it lists.
    ///
    /// `notes` must cite this reference; ordering is kept as given.
    pub fn from_document(document: ReferenceDocument, notes: Vec<Note>) -> ModelResult<Self> {
        let id: ReferenceId = parse_id("id", &document.id)?;
        let mut reference = Reference {
            id,
            kind: ReferenceKind::parse(&document.kind),
            title: document.title,
            authors: document.authors,
            year: document.year,
            details: ReferenceDetails {
                url: document.url,
                publisher: document.publisher,
                journal: document.journal,
                volume: document.volume,
                number: document.number,
                pages: document.pages,
                doi: document.doi,
                isbn: document.isbn,
                extra_fields: document.extra_fields,
            },
            summary: document.summary,
            notes: Vec::new(),
        };
        reference.validate()?;
        reference.attach_notes(notes)?;
        Ok(reference)
    }

    pub fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("kind".to_string(), Value::from(self.kind.as_str()));
        metadata.insert("year".to_string(), Value::from(self.year));
        metadata.insert("authors".to_string(), Value::from(self.authors.as_str()));
        metadata
    }
}

/// Parses a UUID field. Accepts hyphenated and simple (hex) forms.
pub(crate) fn parse_id(field: &str, value: &str) -> ModelResult<Uuid> {
    let id = Uuid::parse_str(value)
        .map_err(|_| ModelError::Format(format!("invalid uuid `{value}` in {field}")))?;
    if id.is_nil() {
        return Err(ModelError::Format(format!("nil uuid in {field}")));
    }
    Ok(id)
}

/// Formats a timestamp as RFC 3339 UTC with exact sub-second precision.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses RFC 3339 (any offset) or a naive ISO-8601 timestamp read as UTC.
pub fn parse_timestamp(value: &str) -> ModelResult<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| ModelError::Format(format!("invalid timestamp `{value}` in date_created")))
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp, parse_id, parse_timestamp};
    use chrono::{TimeZone, Timelike, Utc};

    #[test]
    fn parse_timestamp_normalizes_offsets_to_utc() {
        let parsed = parse_timestamp("2024-03-01T10:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn parse_timestamp_accepts_naive_legacy_values() {
        let parsed = parse_timestamp("2020-01-01T00:00:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());

        let fractional = parse_timestamp("2020-01-01T00:00:00.250000").unwrap();
        assert_eq!(fractional.nanosecond(), 250_000_000);
    }

    #[test]
    fn format_then_parse_keeps_nanoseconds() {
        let value = Utc
            .with_ymd_and_hms(2024, 5, 6, 7, 8, 9)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        let text = format_timestamp(value);
        assert!(text.ends_with('Z'));
        assert_eq!(parse_timestamp(&text).unwrap(), value);
    }

    #[test]
    fn parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn parse_id_accepts_simple_form_and_rejects_nil() {
        let id = parse_id("id", "f8b6a9a26b6c4a4d8b9a2a6b6c4a4d8b").unwrap();
        assert_eq!(id.to_string(), "f8b6a9a2-6b6c-4a4d-8b9a-2a6b6c4a4d8b");
        assert!(parse_id("id", "00000000-0000-0000-0000-000000000000").is_err());
    }
}
