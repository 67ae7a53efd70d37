//! Note domain model.
//!
//! # Responsibility
//! - Define the shared note record and its variant discriminator.
//! - Provide tag, relation and lifecycle mutations.
//! - Implement the fleeting -> permanent promotion.
//!
//! # Invariants
//! - `id` and `date_created` are fixed at construction.
//! - A parent, once assigned, is never replaced.
//! - `tags` never contains blank or duplicate values.
//! - `kind` is chosen by the constructor and never changes afterwards.
//! - `Untyped` never carries a built-in tag, so the wire tag alone picks
//!   the variant on decode.

use crate::model::error::{ModelError, ModelResult, ValidationError};
use crate::model::reference::ReferenceId;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Stable identifier for notes.
pub type NoteId = Uuid;

/// Variant discriminator for notes.
///
/// Replaces a class hierarchy: all variants share one field set and differ
/// only by this tag (plus the reference link carried by `Literature`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NoteKind {
    /// Quick capture, expected to be promoted or archived later.
    Fleeting,
    /// Notes about one external source.
    Literature { reference_id: ReferenceId },
    /// Distilled, long-lived note.
    Permanent,
    /// Unknown wire tag, kept verbatim for forward compatibility.
    Untyped(String),
}

const BUILT_IN_TAGS: [&str; 3] = ["fleeting", "literature", "permanent"];

impl NoteKind {
    /// Wire tag written as `variant_kind`.
    pub fn as_tag(&self) -> &str {
        match self {
            Self::Fleeting => "fleeting",
            Self::Literature { .. } => "literature",
            Self::Permanent => "permanent",
            Self::Untyped(tag) => tag.as_str(),
        }
    }

    pub fn reference_id(&self) -> Option<ReferenceId> {
        match self {
            Self::Literature { reference_id } => Some(*reference_id),
            _ => None,
        }
    }

    fn check(&self) -> Result<(), ValidationError> {
        match self {
            Self::Untyped(tag) if BUILT_IN_TAGS.contains(&tag.as_str()) => {
                Err(ValidationError::ReservedKindTag(tag.clone()))
            }
            _ => Ok(()),
        }
    }
}

/// Lifecycle state of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteStatus {
    Active,
    /// Soft-deleted. Kept in storage and still resolvable by id.
    Archived,
}

impl NoteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Construction input shared by every note variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteInput {
    pub title: String,
    pub text: String,
    pub parent_id: Option<NoteId>,
    pub related_ids: Vec<NoteId>,
    pub tags: Vec<String>,
}

impl NoteInput {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent_id: NoteId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_related(mut self, related_ids: impl IntoIterator<Item = NoteId>) -> Self {
        self.related_ids.extend(related_ids);
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

/// Canonical note record.
///
/// Identity, timestamps, links and tags are only reachable through methods
/// so the invariants above hold for every instance built by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub(crate) id: NoteId,
    pub(crate) kind: NoteKind,
    pub title: String,
    pub text: String,
    pub(crate) parent_id: Option<NoteId>,
    pub(crate) related_ids: Vec<NoteId>,
    pub(crate) date_created: DateTime<Utc>,
    pub(crate) tags: Vec<String>,
    pub status: NoteStatus,
}

impl Note {
    /// Creates a note with a fresh id, `status=active` and `date_created=now`.
    pub fn new(kind: NoteKind, input: NoteInput) -> ModelResult<Self> {
        Self::with_id(Uuid::new_v4(), kind, input)
    }

    /// Creates a note with a caller-provided id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(id: NoteId, kind: NoteKind, input: NoteInput) -> ModelResult<Self> {
        if id.is_nil() {
            return Err(ValidationError::NilId.into());
        }
        kind.check()?;
        validate_content(&input.title, &input.text)?;
        let tags = collect_tags(input.tags)?;

        Ok(Self {
            id,
            kind,
            title: input.title,
            text: input.text,
            parent_id: input.parent_id,
            related_ids: input.related_ids,
            date_created: Utc::now(),
            tags,
            status: NoteStatus::Active,
        })
    }

    pub fn fleeting(input: NoteInput) -> ModelResult<Self> {
        Self::new(NoteKind::Fleeting, input)
    }

    pub fn permanent(input: NoteInput) -> ModelResult<Self> {
        Self::new(NoteKind::Permanent, input)
    }

    /// Creates a literature note bound to `reference_id`.
    ///
    /// Prefer `Reference::add_note`, which also records the note on the
    /// reference side.
    pub fn literature(reference_id: ReferenceId, input: NoteInput) -> ModelResult<Self> {
        Self::new(NoteKind::Literature { reference_id }, input)
    }

    pub fn id(&self) -> NoteId {
        self.id
    }

    pub fn kind(&self) -> &NoteKind {
        &self.kind
    }

    pub fn variant_kind(&self) -> &str {
        self.kind.as_tag()
    }

    pub fn reference_id(&self) -> Option<ReferenceId> {
        self.kind.reference_id()
    }

    pub fn parent_id(&self) -> Option<NoteId> {
        self.parent_id
    }

    pub fn related_ids(&self) -> &[NoteId] {
        &self.related_ids
    }

    pub fn date_created(&self) -> DateTime<Utc> {
        self.date_created
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_fleeting(&self) -> bool {
        self.kind == NoteKind::Fleeting
    }

    pub fn is_active(&self) -> bool {
        self.status == NoteStatus::Active
    }

    /// Sets the parent link.
    ///
    /// # Errors
    /// - `InvalidState` when a parent is already set (existing link is kept).
    /// - `InvalidState` when `parent_id` is this note's own id.
    pub fn add_parent(&mut self, parent_id: NoteId) -> ModelResult<()> {
        if let Some(existing) = self.parent_id {
            return Err(ModelError::InvalidState(format!(
                "note {} already has parent {existing}",
                self.id
            )));
        }
        if parent_id == self.id {
            return Err(ModelError::InvalidState(format!(
                "note {} cannot be its own parent",
                self.id
            )));
        }
        self.parent_id = Some(parent_id);
        Ok(())
    }

    /// Appends one related link. Duplicates are kept.
    pub fn add_related(&mut self, related_id: NoteId) {
        self.related_ids.push(related_id);
    }

    /// Appends several related links in iteration order.
    pub fn extend_related(&mut self, related_ids: impl IntoIterator<Item = NoteId>) {
        self.related_ids.extend(related_ids);
    }

    /// Adds a tag if absent. Returns whether the tag set changed.
    pub fn add_tag(&mut self, tag: &str) -> ModelResult<bool> {
        let tag = normalize_tag(tag).ok_or(ValidationError::BlankTag)?;
        if self.tags.contains(&tag) {
            return Ok(false);
        }
        self.tags.push(tag);
        Ok(true)
    }

    /// Removes a tag if present. Returns whether the tag set changed.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let Some(tag) = normalize_tag(tag) else {
            return false;
        };
        let before = self.tags.len();
        self.tags.retain(|current| *current != tag);
        self.tags.len() != before
    }

    pub fn archive(&mut self) {
        self.status = NoteStatus::Archived;
    }

    pub fn restore(&mut self) {
        self.status = NoteStatus::Active;
    }

    /// Promotes a fleeting note into a new permanent note.
    ///
    /// The permanent note inherits parent and tags, and its related set is
    /// this note's related set followed by this note's id. This note then
    /// links back to the permanent note and is archived.
    ///
    /// # Errors
    /// - `InvalidState` when this note is not fleeting.
    /// - `Validation` when `title` or `text` is empty; this note is left
    ///   untouched in that case.
    pub fn create_permanent(
        &mut self,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> ModelResult<Note> {
        if !self.is_fleeting() {
            return Err(ModelError::InvalidState(format!(
                "only fleeting notes can be promoted, note {} is `{}`",
                self.id,
                self.variant_kind()
            )));
        }

        let mut related_ids = self.related_ids.clone();
        related_ids.push(self.id);
        let permanent = Note::permanent(NoteInput {
            title: title.into(),
            text: text.into(),
            parent_id: self.parent_id,
            related_ids,
            tags: self.tags.clone(),
        })?;

        self.add_related(permanent.id);
        self.archive();
        Ok(permanent)
    }

    /// Re-checks construction invariants on the current field values.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId);
        }
        self.kind.check()?;
        validate_content(&self.title, &self.text)?;
        if self.tags.iter().any(|tag| tag.trim().is_empty()) {
            return Err(ValidationError::BlankTag);
        }
        Ok(())
    }
}

fn validate_content(title: &str, text: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyText);
    }
    Ok(())
}

/// Trims one tag value. Returns `None` for blank input.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Normalizes tags and drops duplicates, keeping first-seen order.
pub(crate) fn collect_tags(tags: Vec<String>) -> Result<Vec<String>, ValidationError> {
    let mut unique: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = normalize_tag(&tag).ok_or(ValidationError::BlankTag)?;
        if !unique.contains(&tag) {
            unique.push(tag);
        }
    }
    Ok(unique)
}

#[cfg(test)]
mod tests {
    use super::{collect_tags, normalize_tag, NoteKind, NoteStatus};
    use crate::model::error::ValidationError;

    #[test]
    fn collect_tags_keeps_first_seen_order() {
        let tags = collect_tags(vec![
            "b".to_string(),
            " a ".to_string(),
            "b".to_string(),
        ])
        .unwrap();
        assert_eq!(tags, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn collect_tags_rejects_blank_values() {
        let err = collect_tags(vec!["ok".to_string(), "  ".to_string()]).unwrap_err();
        assert_eq!(err, ValidationError::BlankTag);
    }

    #[test]
    fn normalize_tag_preserves_case() {
        assert_eq!(normalize_tag(" Rust ").as_deref(), Some("Rust"));
        assert_eq!(normalize_tag("\t"), None);
    }

    #[test]
    fn untyped_kind_reports_original_tag() {
        let kind = NoteKind::Untyped("index".to_string());
        assert_eq!(kind.as_tag(), "index");
        assert_eq!(kind.reference_id(), None);
    }

    #[test]
    fn status_parse_is_strict() {
        assert_eq!(NoteStatus::parse("archived"), Some(NoteStatus::Archived));
        assert_eq!(NoteStatus::parse("Archived"), None);
    }
}
