//! Document store contract and implementations.
//!
//! # Responsibility
//! - Define the narrow get/upsert interface used for note persistence.
//! - Provide SQLite-backed and in-memory implementations.
//!
//! # Invariants
//! - `upsert` is create-or-replace keyed by id (atomic per key).
//! - Lookup misses are `Ok(None)`, never an error.
//! - `get_many` omits missing ids and keeps the requested order.

use crate::db::DbError;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory_store;
pub mod sqlite_store;

pub use crate::model::document::Metadata;

pub type StoreResult<T> = Result<T, StoreError>;

/// Backend failure raised by a document store.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Document or metadata could not be encoded for storage.
    Encoding(serde_json::Error),
    /// Persisted state is unreadable or inconsistent.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encoding(err) => write!(f, "document encoding failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid stored document: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encoding(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One stored entry as returned by `get`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub document: Value,
    pub metadata: Metadata,
}

/// Key/document store addressed by id.
pub trait DocumentStore {
    /// Fetches one document. Returns `None` when the id is unknown.
    fn get(&self, id: &str) -> StoreResult<Option<StoredDocument>>;

    /// Fetches several documents, skipping unknown ids.
    fn get_many(&self, ids: &[String]) -> StoreResult<Vec<StoredDocument>> {
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(document) = self.get(id)? {
                found.push(document);
            }
        }
        Ok(found)
    }

    /// Creates or replaces the document stored under `id`.
    fn upsert(&self, id: &str, document: &Value, metadata: &Metadata) -> StoreResult<()>;
}

impl<T: DocumentStore + ?Sized> DocumentStore for &T {
    fn get(&self, id: &str) -> StoreResult<Option<StoredDocument>> {
        (**self).get(id)
    }

    fn get_many(&self, ids: &[String]) -> StoreResult<Vec<StoredDocument>> {
        (**self).get_many(ids)
    }

    fn upsert(&self, id: &str, document: &Value, metadata: &Metadata) -> StoreResult<()> {
        (**self).upsert(id, document, metadata)
    }
}
