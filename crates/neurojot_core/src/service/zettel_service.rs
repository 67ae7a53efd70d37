//! Zettelkasten workflow service.
//!
//! # Responsibility
//! - Capture fleeting notes and promote them to permanent notes.
//! - Attach literature notes to stored references.
//! - Link stored notes.
//!
//! # Invariants
//! - Every workflow loads its inputs by id and persists all touched notes.
//! - Promotion writes the permanent note before the archived source, so a
//!   failed write never leaves an archived note without its successor.

use crate::model::error::ModelError;
use crate::model::note::{Note, NoteId, NoteInput};
use crate::model::reference::{Reference, ReferenceId};
use crate::repo::note_repo::{NoteRepository, RepoError};
use crate::store::DocumentStore;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for Zettelkasten workflows.
#[derive(Debug)]
pub enum ZettelServiceError {
    NoteNotFound(NoteId),
    ReferenceNotFound(ReferenceId),
    /// Rejected by a model invariant (validation or state).
    Model(ModelError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ZettelServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::ReferenceNotFound(id) => write!(f, "reference not found: {id}"),
            Self::Model(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ZettelServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Model(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelError> for ZettelServiceError {
    fn from(value: ModelError) -> Self {
        Self::Model(value)
    }
}

impl From<RepoError> for ZettelServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Model(err) => Self::Model(err),
            other => Self::Repo(other),
        }
    }
}

pub type ZettelResult<T> = Result<T, ZettelServiceError>;

/// Workflow facade over a note repository.
pub struct ZettelService<S: DocumentStore> {
    repo: NoteRepository<S>,
}

impl<S: DocumentStore> ZettelService<S> {
    pub fn new(repo: NoteRepository<S>) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &NoteRepository<S> {
        &self.repo
    }

    /// Creates and stores a fleeting note.
    pub fn capture_fleeting(&self, input: NoteInput) -> ZettelResult<Note> {
        let note = Note::fleeting(input)?;
        self.repo.save_note(&note)?;
        info!(
            "event=note_capture module=service status=ok note_id={}",
            note.id()
        );
        Ok(note)
    }

    /// Stores an already-built note (any variant).
    pub fn save_note(&self, note: &Note) -> ZettelResult<()> {
        self.repo.save_note(note)?;
        Ok(())
    }

    pub fn get_note(&self, id: NoteId) -> ZettelResult<Option<Note>> {
        Ok(self.repo.get_note(id)?)
    }

    /// Promotes a stored fleeting note and persists both notes.
    ///
    /// Returns the new permanent note.
    pub fn promote_fleeting(
        &self,
        fleeting_id: NoteId,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> ZettelResult<Note> {
        let mut fleeting = self.require_note(fleeting_id)?;
        let permanent = fleeting.create_permanent(title, text)?;

        self.repo.save_note(&permanent)?;
        self.repo.save_note(&fleeting)?;
        info!(
            "event=note_promote module=service status=ok fleeting_id={} permanent_id={}",
            fleeting.id(),
            permanent.id()
        );
        Ok(permanent)
    }

    /// Adds a related link from `note_id` to `related_id` (both must exist).
    pub fn link_related(&self, note_id: NoteId, related_id: NoteId) -> ZettelResult<Note> {
        let mut note = self.require_note(note_id)?;
        self.require_note(related_id)?;
        note.add_related(related_id);
        self.repo.save_note(&note)?;
        Ok(note)
    }

    /// Stores a reference together with its literature notes.
    pub fn save_reference(&self, reference: &Reference) -> ZettelResult<()> {
        self.repo.save_reference(reference)?;
        info!(
            "event=reference_save module=service status=ok reference_id={}",
            reference.id()
        );
        Ok(())
    }

    pub fn get_reference(&self, id: ReferenceId) -> ZettelResult<Option<Reference>> {
        Ok(self.repo.get_reference(id)?)
    }

    /// Writes a literature note through its stored reference.
    ///
    /// The note is appended to the reference and both sides are persisted.
    pub fn add_literature_note(
        &self,
        reference_id: ReferenceId,
        input: NoteInput,
    ) -> ZettelResult<Note> {
        let mut reference = self
            .repo
            .get_reference(reference_id)?
            .ok_or(ZettelServiceError::ReferenceNotFound(reference_id))?;
        let note = reference.add_note(input)?.clone();
        self.repo.save_reference(&reference)?;
        info!(
            "event=literature_note_add module=service status=ok reference_id={} note_id={}",
            reference_id,
            note.id()
        );
        Ok(note)
    }

    /// Archives a stored note (soft delete).
    pub fn archive_note(&self, note_id: NoteId) -> ZettelResult<Note> {
        let mut note = self.require_note(note_id)?;
        note.archive();
        self.repo.save_note(&note)?;
        Ok(note)
    }

    fn require_note(&self, id: NoteId) -> ZettelResult<Note> {
        self.repo
            .get_note(id)?
            .ok_or(ZettelServiceError::NoteNotFound(id))
    }
}
