//! Model-level error taxonomy.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ModelResult<T> = Result<T, ModelError>;

/// Construction or mutation input that breaks a model invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyTitle,
    EmptyText,
    BlankTag,
    NilId,
    /// A required descriptive field (named) is blank.
    EmptyField(&'static str),
    /// `NoteKind::Untyped` carrying a tag owned by a built-in variant.
    ReservedKindTag(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::EmptyText => write!(f, "text must not be empty"),
            Self::BlankTag => write!(f, "tag must not be blank"),
            Self::NilId => write!(f, "id must not be nil"),
            Self::EmptyField(field) => write!(f, "{field} must not be empty"),
            Self::ReservedKindTag(tag) => {
                write!(f, "untyped note kind must not use built-in tag `{tag}`")
            }
        }
    }
}

impl Error for ValidationError {}

/// Errors raised by note/reference operations and document decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    Validation(ValidationError),
    /// Operation not allowed in the current state (e.g. re-parenting).
    InvalidState(String),
    /// Malformed serialized document.
    Format(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidState(message) => write!(f, "invalid state: {message}"),
            Self::Format(message) => write!(f, "malformed document: {message}"),
        }
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidState(_) | Self::Format(_) => None,
        }
    }
}

impl From<ValidationError> for ModelError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(value: serde_json::Error) -> Self {
        Self::Format(value.to_string())
    }
}
