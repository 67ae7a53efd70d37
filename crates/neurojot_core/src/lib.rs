//! Core domain logic for NeuroJot, a Zettelkasten note graph.
//! This crate is the single source of truth for note invariants and the
//! document wire contract.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::document::{Metadata, NoteDocument, ReferenceDocument};
pub use model::error::{ModelError, ModelResult, ValidationError};
pub use model::note::{Note, NoteId, NoteInput, NoteKind, NoteStatus};
pub use model::reference::{Reference, ReferenceDetails, ReferenceId, ReferenceKind};
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult};
pub use service::zettel_service::{ZettelResult, ZettelService, ZettelServiceError};
pub use store::memory_store::MemoryDocumentStore;
pub use store::sqlite_store::{SqliteDocumentStore, NOTES_COLLECTION, REFERENCES_COLLECTION};
pub use store::{DocumentStore, StoreError, StoreResult, StoredDocument};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
