//! Repository layer over document stores.
//!
//! # Responsibility
//! - Map notes/references to store documents and back.
//! - Keep store details out of service orchestration.
//!
//! # Invariants
//! - Writes enforce `validate()` before persistence.
//! - "Not found" is `Ok(None)`; backend failures are `RepoError::Store`.

pub mod note_repo;
