use neurojot_core::{
    ModelError, Note, NoteDocument, NoteInput, NoteKind, NoteStatus, ValidationError,
};
use serde_json::json;
use uuid::Uuid;

const NOTE_ID: &str = "f8b6a9a2-6b6c-4a4d-8b9a-2a6b6c4a4d8b";
const OTHER_ID: &str = "11111111-2222-4333-8444-555555555555";

fn legacy_document(variant_kind: &str) -> serde_json::Value {
    json!({
        "id": NOTE_ID,
        "title": "test title",
        "text": "test text",
        "parent_note_id": OTHER_ID,
        "related_notes_ids": [OTHER_ID, OTHER_ID],
        "date_created": "2020-01-01T00:00:00",
        "tags": ["test", "tag"],
        "variant_kind": variant_kind,
        "status": "active"
    })
}

#[test]
fn document_uses_expected_wire_fields() {
    let parent = Uuid::new_v4();
    let related = Uuid::new_v4();
    let note = Note::permanent(
        NoteInput::new("t", "body")
            .with_parent(parent)
            .with_related([related])
            .with_tags(["a"]),
    )
    .unwrap();

    let value = serde_json::to_value(note.to_document()).unwrap();
    assert_eq!(value["id"], note.id().to_string());
    assert_eq!(value["title"], "t");
    assert_eq!(value["text"], "body");
    assert_eq!(value["parent_note_id"], parent.to_string());
    assert_eq!(value["related_notes_ids"], json!([related.to_string()]));
    assert_eq!(value["tags"], json!(["a"]));
    assert_eq!(value["variant_kind"], "permanent");
    assert_eq!(value["status"], "active");
    assert!(value["date_created"].as_str().unwrap().ends_with('Z'));
    assert!(value.get("reference_id").is_none());
}

#[test]
fn document_for_parentless_note_has_null_parent() {
    let note = Note::fleeting(NoteInput::new("t", "body")).unwrap();
    let value = serde_json::to_value(note.to_document()).unwrap();
    assert!(value["parent_note_id"].is_null());
}

#[test]
fn json_text_is_the_encoded_document() {
    let note = Note::fleeting(NoteInput::new("t", "body")).unwrap();
    let from_text: NoteDocument = serde_json::from_str(&note.to_json().unwrap()).unwrap();
    assert_eq!(from_text, note.to_document());
}

#[test]
fn roundtrip_preserves_every_field_for_each_variant() {
    let reference_id = Uuid::new_v4();
    let parent = Uuid::new_v4();
    let kinds = [
        NoteKind::Fleeting,
        NoteKind::Permanent,
        NoteKind::Literature { reference_id },
        NoteKind::Untyped("index".to_string()),
    ];

    for kind in kinds {
        let mut note = Note::new(
            kind,
            NoteInput::new("t", "body")
                .with_related([Uuid::new_v4(), Uuid::new_v4()])
                .with_tags(["a", "b"]),
        )
        .unwrap();
        note.add_parent(parent).unwrap();
        note.archive();

        let decoded = Note::from_json(&note.to_json().unwrap()).unwrap();
        assert_eq!(decoded, note);
    }
}

#[test]
fn serde_impls_go_through_the_document_shape() {
    let note = Note::literature(Uuid::new_v4(), NoteInput::new("t", "body")).unwrap();
    let value = serde_json::to_value(&note).unwrap();
    assert_eq!(value, serde_json::to_value(note.to_document()).unwrap());

    let decoded: Note = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, note);
}

#[test]
fn scenario_tags_survive_roundtrip() {
    let mut note = Note::new(
        NoteKind::Permanent,
        NoteInput::new("t", "body").with_tags(["a", "b"]),
    )
    .unwrap();
    note.add_tag("a").unwrap();
    note.remove_tag("z");
    assert_eq!(note.tags(), ["a".to_string(), "b".to_string()]);

    let decoded = Note::from_json(&note.to_json().unwrap()).unwrap();
    assert_eq!(decoded.title, "t");
    assert_eq!(decoded.text, "body");
    assert_eq!(decoded.tags(), ["a".to_string(), "b".to_string()]);
    assert_eq!(decoded.status, NoteStatus::Active);
}

#[test]
fn decode_dispatches_on_variant_kind() {
    let fleeting = Note::from_value(legacy_document("fleeting")).unwrap();
    assert!(fleeting.is_fleeting());

    let permanent = Note::from_value(legacy_document("permanent")).unwrap();
    assert_eq!(permanent.kind(), &NoteKind::Permanent);

    let mut literature = legacy_document("literature");
    literature["reference_id"] = json!(OTHER_ID);
    let literature = Note::from_value(literature).unwrap();
    assert_eq!(
        literature.reference_id(),
        Some(Uuid::parse_str(OTHER_ID).unwrap())
    );
}

#[test]
fn decoded_fleeting_note_can_be_promoted() {
    let mut fleeting = Note::from_value(legacy_document("fleeting")).unwrap();
    let permanent = fleeting.create_permanent("p", "q").unwrap();
    assert!(permanent.related_ids().contains(&fleeting.id()));
}

#[test]
fn decode_restores_identity_links_and_timestamp() {
    let note = Note::from_value(legacy_document("permanent")).unwrap();
    let other = Uuid::parse_str(OTHER_ID).unwrap();

    assert_eq!(note.id().to_string(), NOTE_ID);
    assert_eq!(note.parent_id(), Some(other));
    assert_eq!(note.related_ids(), [other, other]);
    assert_eq!(note.date_created().to_rfc3339(), "2020-01-01T00:00:00+00:00");
}

#[test]
fn unknown_variant_kind_falls_back_to_untyped() {
    let note = Note::from_value(legacy_document("structure")).unwrap();
    assert_eq!(note.kind(), &NoteKind::Untyped("structure".to_string()));
    assert_eq!(note.to_document().variant_kind, "structure");
}

#[test]
fn untyped_kind_with_built_in_tag_is_rejected() {
    for tag in ["fleeting", "literature", "permanent"] {
        let err = Note::new(NoteKind::Untyped(tag.to_string()), NoteInput::new("t", "body"))
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::Validation(ValidationError::ReservedKindTag(tag.to_string()))
        );
    }
}

#[test]
fn untyped_kind_with_custom_tag_round_trips() {
    let note = Note::new(
        NoteKind::Untyped("structure".to_string()),
        NoteInput::new("t", "body").with_tags(["hub"]),
    )
    .unwrap();
    assert_eq!(note.validate(), Ok(()));

    let decoded = Note::from_json(&note.to_json().unwrap()).unwrap();
    assert_eq!(decoded, note);
}

#[test]
fn legacy_type_key_and_hex_ids_are_accepted() {
    let value = json!({
        "id": "f8b6a9a26b6c4a4d8b9a2a6b6c4a4d8b",
        "title": "test title",
        "text": "test text",
        "parent_note_id": null,
        "related_notes_ids": [],
        "date_created": "2020-01-01T00:00:00.500000",
        "tags": [],
        "type": "fleeting",
        "status": "archived"
    });

    let note = Note::from_value(value).unwrap();
    assert_eq!(note.id().to_string(), NOTE_ID);
    assert!(note.is_fleeting());
    assert_eq!(note.status, NoteStatus::Archived);
}

#[test]
fn decode_accepts_json_text_inside_a_value() {
    let note = Note::fleeting(NoteInput::new("t", "body")).unwrap();
    let text = note.to_json().unwrap();
    let decoded = Note::from_value(serde_json::Value::String(text)).unwrap();
    assert_eq!(decoded, note);
}

#[test]
fn literature_without_reference_id_is_a_format_error() {
    let err = Note::from_value(legacy_document("literature")).unwrap_err();
    assert!(matches!(err, ModelError::Format(_)), "unexpected error: {err}");
}

#[test]
fn malformed_fields_are_format_errors() {
    let mut bad_id = legacy_document("fleeting");
    bad_id["id"] = json!("not-a-uuid");
    assert!(matches!(
        Note::from_value(bad_id),
        Err(ModelError::Format(_))
    ));

    let mut bad_related = legacy_document("fleeting");
    bad_related["related_notes_ids"] = json!(["nope"]);
    assert!(matches!(
        Note::from_value(bad_related),
        Err(ModelError::Format(_))
    ));

    let mut bad_time = legacy_document("fleeting");
    bad_time["date_created"] = json!("01/01/2020");
    assert!(matches!(
        Note::from_value(bad_time),
        Err(ModelError::Format(_))
    ));

    let mut bad_status = legacy_document("fleeting");
    bad_status["status"] = json!("deleted");
    assert!(matches!(
        Note::from_value(bad_status),
        Err(ModelError::Format(_))
    ));

    let mut missing_title = legacy_document("fleeting");
    missing_title.as_object_mut().unwrap().remove("title");
    assert!(matches!(
        Note::from_value(missing_title),
        Err(ModelError::Format(_))
    ));
}

#[test]
fn metadata_projection_carries_filter_fields() {
    let reference_id = Uuid::new_v4();
    let note = Note::literature(reference_id, NoteInput::new("t", "body").with_tags(["x"])).unwrap();
    let metadata = note.metadata();

    assert_eq!(metadata["variant_kind"], "literature");
    assert_eq!(metadata["tags"], json!(["x"]));
    assert_eq!(metadata["date_created"], note.to_document().date_created);
    assert_eq!(metadata["reference_id"], reference_id.to_string());

    let fleeting = Note::fleeting(NoteInput::new("t", "body")).unwrap();
    assert!(!fleeting.metadata().contains_key("reference_id"));
}
