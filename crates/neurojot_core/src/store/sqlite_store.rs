//! SQLite-backed document store.
//!
//! # Responsibility
//! - Persist JSON documents and metadata in the `documents` table.
//! - Keep SQL details inside the store boundary.
//!
//! # Invariants
//! - Rows are partitioned by `collection`; one store sees one collection.
//! - Read paths reject unparsable persisted JSON instead of masking it.

use crate::db::migrations::require_current;
use crate::store::{DocumentStore, Metadata, StoreError, StoreResult, StoredDocument};
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

/// Default collection for note documents.
pub const NOTES_COLLECTION: &str = "notes";
/// Default collection for reference documents.
pub const REFERENCES_COLLECTION: &str = "references";

/// Document store over one collection of a migrated connection.
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
    collection: String,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Constructs a store from a migrated connection.
    ///
    /// # Errors
    /// - `InvalidData` when `collection` is blank.
    /// - `Db(SchemaBehind)` when the connection was not opened through
    ///   `db::open_db*`.
    pub fn try_new(conn: &'conn Connection, collection: impl Into<String>) -> StoreResult<Self> {
        let collection = collection.into();
        if collection.trim().is_empty() {
            return Err(StoreError::InvalidData(
                "collection name must not be empty".to_string(),
            ));
        }
        require_current(conn)?;
        Ok(Self { conn, collection })
    }

    pub fn notes(conn: &'conn Connection) -> StoreResult<Self> {
        Self::try_new(conn, NOTES_COLLECTION)
    }

    pub fn references(conn: &'conn Connection) -> StoreResult<Self> {
        Self::try_new(conn, REFERENCES_COLLECTION)
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Counts documents in this collection.
    pub fn count(&self) -> StoreResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1;",
            [self.collection.as_str()],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| StoreError::InvalidData(format!("negative document count {count}")))
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn get(&self, id: &str) -> StoreResult<Option<StoredDocument>> {
        let row = self
            .conn
            .query_row(
                "SELECT document, metadata
                 FROM documents
                 WHERE collection = ?1 AND id = ?2;",
                params![self.collection.as_str(), id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        let Some((document_text, metadata_text)) = row else {
            debug!(
                "event=document_get module=store status=miss collection={} id={id}",
                self.collection
            );
            return Ok(None);
        };

        let document: Value = serde_json::from_str(&document_text).map_err(|err| {
            StoreError::InvalidData(format!(
                "document `{id}` in `{}` is not valid JSON: {err}",
                self.collection
            ))
        })?;
        let metadata = match serde_json::from_str::<Value>(&metadata_text) {
            Ok(Value::Object(map)) => map,
            _ => {
                return Err(StoreError::InvalidData(format!(
                    "metadata of `{id}` in `{}` is not a JSON object",
                    self.collection
                )));
            }
        };

        Ok(Some(StoredDocument {
            id: id.to_string(),
            document,
            metadata,
        }))
    }

    fn upsert(&self, id: &str, document: &Value, metadata: &Metadata) -> StoreResult<()> {
        let document_text = serde_json::to_string(document).map_err(StoreError::Encoding)?;
        let metadata_text = serde_json::to_string(metadata).map_err(StoreError::Encoding)?;

        let result = self.conn.execute(
            "INSERT INTO documents (collection, id, document, metadata)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (collection, id) DO UPDATE SET
                document = excluded.document,
                metadata = excluded.metadata,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                self.collection.as_str(),
                id,
                document_text,
                metadata_text
            ],
        );

        match result {
            Ok(_) => {
                debug!(
                    "event=document_upsert module=store status=ok collection={} id={id}",
                    self.collection
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=document_upsert module=store status=error collection={} id={id} error={err}",
                    self.collection
                );
                Err(err.into())
            }
        }
    }
}
