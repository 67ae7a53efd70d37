//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into Zettelkasten workflows.
//! - Keep callers decoupled from storage details.

pub mod zettel_service;
