//! Note/reference persistence over document stores.
//!
//! # Responsibility
//! - Save and load notes and references through `DocumentStore`.
//! - Resolve id links (parent, related, reference) by explicit lookup.
//!
//! # Invariants
//! - Writes call `validate()` before touching the store.
//! - A stored document whose id differs from its key is rejected.
//! - Missing documents are `Ok(None)` (or skipped for multi-gets).

use crate::model::document::ReferenceDocument;
use crate::model::error::{ModelError, ValidationError};
use crate::model::note::{Note, NoteId};
use crate::model::reference::{Reference, ReferenceId};
use crate::store::sqlite_store::SqliteDocumentStore;
use crate::store::{DocumentStore, StoreError, StoredDocument};
use log::{debug, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence-layer error for note and reference operations.
#[derive(Debug)]
pub enum RepoError {
    /// Record failed validation or its stored document is malformed.
    Model(ModelError),
    /// Store backend failure, surfaced unmodified.
    Store(StoreError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Model(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Model(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ModelError> for RepoError {
    fn from(value: ModelError) -> Self {
        Self::Model(value)
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Model(ModelError::Validation(value))
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Store(StoreError::Encoding(value))
    }
}

impl Note {
    /// Upserts this note's document and metadata projection under its id.
    pub fn save<S: DocumentStore + ?Sized>(&self, store: &S) -> RepoResult<()> {
        self.validate()?;
        let document = serde_json::to_value(self.to_document())?;
        store.upsert(&self.id().to_string(), &document, &self.metadata())?;
        debug!(
            "event=note_save module=repo status=ok note_id={} variant_kind={}",
            self.id(),
            self.variant_kind()
        );
        Ok(())
    }

    /// Loads one note by id. Returns `None` when absent.
    pub fn get<S: DocumentStore + ?Sized>(store: &S, id: NoteId) -> RepoResult<Option<Note>> {
        match store.get(&id.to_string())? {
            Some(stored) => Ok(Some(decode_note(stored)?)),
            None => Ok(None),
        }
    }

    /// Loads several notes, skipping ids with no stored document.
    pub fn get_many<S: DocumentStore + ?Sized>(
        store: &S,
        ids: &[NoteId],
    ) -> RepoResult<Vec<Note>> {
        let keys: Vec<String> = ids.iter().map(NoteId::to_string).collect();
        let found = store.get_many(&keys)?;
        if found.len() < keys.len() {
            warn!(
                "event=note_get_many module=repo status=partial requested={} found={}",
                keys.len(),
                found.len()
            );
        }
        found.into_iter().map(decode_note).collect()
    }
}

impl Reference {
    /// Saves this reference and its literature notes into one store.
    ///
    /// References and notes then share one key space. `Note::get` with a
    /// reference id finds the reference document and fails with
    /// `ModelError::Format` rather than returning `None`; use
    /// `NoteRepository` when notes and references need separate lookups.
    pub fn save<S: DocumentStore + ?Sized>(&self, store: &S) -> RepoResult<()> {
        save_reference_into(self, store, store)
    }

    /// Loads a reference and its literature notes from one store.
    ///
    /// A note id stored in the same store decodes as a reference and fails
    /// with `ModelError::Format`.
    pub fn get<S: DocumentStore + ?Sized>(
        store: &S,
        id: ReferenceId,
    ) -> RepoResult<Option<Reference>> {
        load_reference_from(store, store, id)
    }
}

/// Notes and references kept in two separate stores (collections).
pub struct NoteRepository<S: DocumentStore> {
    notes: S,
    references: S,
}

impl<'conn> NoteRepository<SqliteDocumentStore<'conn>> {
    /// Builds a repository over the default SQLite collections.
    pub fn sqlite(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteDocumentStore::notes(conn)?,
            SqliteDocumentStore::references(conn)?,
        ))
    }
}

impl<S: DocumentStore> NoteRepository<S> {
    pub fn new(notes: S, references: S) -> Self {
        Self { notes, references }
    }

    pub fn notes_store(&self) -> &S {
        &self.notes
    }

    pub fn references_store(&self) -> &S {
        &self.references
    }

    pub fn save_note(&self, note: &Note) -> RepoResult<()> {
        note.save(&self.notes)
    }

    pub fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        Note::get(&self.notes, id)
    }

    pub fn get_notes(&self, ids: &[NoteId]) -> RepoResult<Vec<Note>> {
        Note::get_many(&self.notes, ids)
    }

    /// Saves a reference document plus every note it owns.
    pub fn save_reference(&self, reference: &Reference) -> RepoResult<()> {
        save_reference_into(reference, &self.references, &self.notes)
    }

    pub fn get_reference(&self, id: ReferenceId) -> RepoResult<Option<Reference>> {
        load_reference_from(&self.references, &self.notes, id)
    }

    /// Looks up the parent of `note`, if linked and stored.
    pub fn resolve_parent(&self, note: &Note) -> RepoResult<Option<Note>> {
        match note.parent_id() {
            Some(parent_id) => self.get_note(parent_id),
            None => Ok(None),
        }
    }

    /// Looks up related notes in link order. Duplicate links resolve twice.
    pub fn resolve_related(&self, note: &Note) -> RepoResult<Vec<Note>> {
        self.get_notes(note.related_ids())
    }

    /// Looks up the reference cited by a literature note.
    pub fn resolve_reference(&self, note: &Note) -> RepoResult<Option<Reference>> {
        match note.reference_id() {
            Some(reference_id) => self.get_reference(reference_id),
            None => Ok(None),
        }
    }
}

fn save_reference_into<R, N>(reference: &Reference, references: &R, notes: &N) -> RepoResult<()>
where
    R: DocumentStore + ?Sized,
    N: DocumentStore + ?Sized,
{
    reference.validate()?;
    for note in reference.notes() {
        note.save(notes)?;
    }
    let document = serde_json::to_value(reference.to_document())?;
    references.upsert(&reference.id().to_string(), &document, &reference.metadata())?;
    debug!(
        "event=reference_save module=repo status=ok reference_id={} notes={}",
        reference.id(),
        reference.notes().len()
    );
    Ok(())
}

fn load_reference_from<R, N>(
    references: &R,
    notes: &N,
    id: ReferenceId,
) -> RepoResult<Option<Reference>>
where
    R: DocumentStore + ?Sized,
    N: DocumentStore + ?Sized,
{
    let Some(stored) = references.get(&id.to_string())? else {
        return Ok(None);
    };
    let document: ReferenceDocument =
        serde_json::from_value(stored.document).map_err(ModelError::from)?;
    let note_ids = document.note_ids()?;
    let literature = Note::get_many(notes, &note_ids)?;
    let reference = Reference::from_document(document, literature)?;
    if reference.id() != id {
        return Err(key_mismatch(&id.to_string(), &reference.id().to_string()));
    }
    Ok(Some(reference))
}

fn decode_note(stored: StoredDocument) -> RepoResult<Note> {
    let note = Note::from_value(stored.document)?;
    if note.id().to_string() != stored.id {
        return Err(key_mismatch(&stored.id, &note.id().to_string()));
    }
    Ok(note)
}

fn key_mismatch(key: &str, document_id: &str) -> RepoError {
    RepoError::Store(StoreError::InvalidData(format!(
        "document stored under `{key}` carries id `{document_id}`"
    )))
}
