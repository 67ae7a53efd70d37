//! Zettelkasten domain model.
//!
//! # Responsibility
//! - Define the note/reference records shared by persistence and services.
//! - Own the document wire shapes exchanged with document stores.
//!
//! # Invariants
//! - Every note and reference is identified by a stable, non-nil UUID.
//! - Links between notes (parent, related, reference) are ids, never owned
//!   objects. Resolution goes through an explicit store lookup.
//! - Archival is a status change, notes are never physically deleted.

pub mod document;
pub mod error;
pub mod note;
pub mod reference;
