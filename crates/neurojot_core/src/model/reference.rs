//! Bibliographic reference model.
//!
//! # Responsibility
//! - Describe an external citable source.
//! - Own the literature notes written about that source.
//!
//! # Invariants
//! - Every note in `notes` is a literature note whose `reference_id`
//!   equals this reference's `id`.
//! - `kind`, `title` and `authors` are never blank.

use crate::model::error::{ModelError, ModelResult, ValidationError};
use crate::model::note::{Note, NoteId, NoteInput};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Stable identifier for references.
pub type ReferenceId = Uuid;

/// Category of a referenced source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Book,
    Article,
    Web,
    /// Any other source category, stored verbatim.
    Other(String),
}

impl ReferenceKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Book => "book",
            Self::Article => "article",
            Self::Web => "web",
            Self::Other(value) => value.as_str(),
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "book" => Self::Book,
            "article" => Self::Article,
            "web" => Self::Web,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Optional bibliographic fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceDetails {
    pub url: Option<String>,
    pub publisher: Option<String>,
    pub journal: Option<String>,
    pub volume: Option<String>,
    pub number: Option<String>,
    pub pages: Option<String>,
    pub doi: Option<String>,
    pub isbn: Option<String>,
    /// Open set of additional named fields (edition, editor, ...).
    pub extra_fields: BTreeMap<String, String>,
}

/// External source that literature notes are written about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub(crate) id: ReferenceId,
    pub kind: ReferenceKind,
    pub title: String,
    pub authors: String,
    pub year: i32,
    pub details: ReferenceDetails,
    pub(crate) summary: Option<String>,
    pub(crate) notes: Vec<Note>,
}

impl Reference {
    /// Creates a reference with a fresh id and no notes.
    pub fn new(
        kind: ReferenceKind,
        title: impl Into<String>,
        authors: impl Into<String>,
        year: i32,
    ) -> ModelResult<Self> {
        Self::with_id(Uuid::new_v4(), kind, title, authors, year)
    }

    /// Creates a reference with a caller-provided id.
    pub fn with_id(
        id: ReferenceId,
        kind: ReferenceKind,
        title: impl Into<String>,
        authors: impl Into<String>,
        year: i32,
    ) -> ModelResult<Self> {
        let reference = Self {
            id,
            kind,
            title: title.into(),
            authors: authors.into(),
            year,
            details: ReferenceDetails::default(),
            summary: None,
            notes: Vec::new(),
        };
        reference.validate()?;
        Ok(reference)
    }

    pub fn with_details(mut self, details: ReferenceDetails) -> Self {
        self.details = details;
        self
    }

    pub fn id(&self) -> ReferenceId {
        self.id
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note_ids(&self) -> Vec<NoteId> {
        self.notes.iter().map(Note::id).collect()
    }

    /// Sets or overwrites the summary annotation.
    pub fn add_summary(&mut self, summary: impl Into<String>) {
        self.summary = Some(summary.into());
    }

    /// Creates a literature note bound to this reference and appends it.
    pub fn add_note(&mut self, input: NoteInput) -> ModelResult<&Note> {
        let note = Note::literature(self.id, input)?;
        self.notes.push(note);
        Ok(&self.notes[self.notes.len() - 1])
    }

    /// Returns a mutable handle to one owned note.
    pub fn note_mut(&mut self, note_id: NoteId) -> Option<&mut Note> {
        self.notes.iter_mut().find(|note| note.id == note_id)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId);
        }
        if self.kind.as_str().trim().is_empty() {
            return Err(ValidationError::EmptyField("kind"));
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.authors.trim().is_empty() {
            return Err(ValidationError::EmptyField("authors"));
        }
        Ok(())
    }

    /// Attaches notes loaded from storage, checking they cite this reference.
    pub(crate) fn attach_notes(&mut self, notes: Vec<Note>) -> ModelResult<()> {
        for note in &notes {
            if note.reference_id() != Some(self.id) {
                return Err(ModelError::Format(format!(
                    "note {} listed by reference {} does not cite it",
                    note.id(),
                    self.id
                )));
            }
        }
        self.notes = notes;
        Ok(())
    }
}
