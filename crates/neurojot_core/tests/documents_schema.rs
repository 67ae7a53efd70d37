use neurojot_core::db::migrations::{latest_version, schema_version};
use neurojot_core::db::{open_db, open_db_in_memory, DbError};
use neurojot_core::{DocumentStore, Metadata, SqliteDocumentStore, StoreError};
use rusqlite::{Connection, ErrorCode};
use serde_json::json;

#[test]
fn documents_are_keyed_by_collection_and_id() {
    let conn = open_db_in_memory().unwrap();
    insert_raw(&conn, "notes", "n-1").unwrap();

    let err = insert_raw(&conn, "notes", "n-1").unwrap_err();
    assert!(
        matches!(err, rusqlite::Error::SqliteFailure(ref e, _) if e.code == ErrorCode::ConstraintViolation),
        "unexpected error: {err}"
    );

    insert_raw(&conn, "references", "n-1").unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM documents WHERE id = 'n-1';", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(rows, 2);
}

#[test]
fn upsert_moves_updated_at_and_keeps_created_at() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::notes(&conn).unwrap();
    store.upsert("n-1", &json!({"v": 1}), &Metadata::new()).unwrap();
    conn.execute(
        "UPDATE documents SET created_at = 1000, updated_at = 1000 WHERE id = 'n-1';",
        [],
    )
    .unwrap();

    store.upsert("n-1", &json!({"v": 2}), &Metadata::new()).unwrap();

    let (created_at, updated_at, document): (i64, i64, String) = conn
        .query_row(
            "SELECT created_at, updated_at, document FROM documents WHERE id = 'n-1';",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(created_at, 1000);
    assert!(updated_at > 1000, "updated_at stayed at {updated_at}");
    assert_eq!(document, r#"{"v":2}"#);
}

#[test]
fn reopened_file_keeps_documents_without_remigrating() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("neurojot.db");

    let conn = open_db(&path).unwrap();
    SqliteDocumentStore::references(&conn)
        .unwrap()
        .upsert("r-1", &json!({"title": "kept"}), &Metadata::new())
        .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    let stored = SqliteDocumentStore::references(&conn)
        .unwrap()
        .get("r-1")
        .unwrap()
        .unwrap();
    assert_eq!(stored.document, json!({"title": "kept"}));
}

#[test]
fn failed_script_is_reported_and_rolled_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clash.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE documents (payload TEXT);").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::Migration { version, name, .. } => {
            assert_eq!(version, 1);
            assert_eq!(name, "documents");
        }
        other => panic!("unexpected error: {other}"),
    }

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), 0);
}

#[test]
fn store_refuses_schema_from_newer_build() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();

    let err = SqliteDocumentStore::notes(&conn).err().unwrap();
    match err {
        StoreError::Db(DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        }) => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn insert_raw(conn: &Connection, collection: &str, id: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO documents (collection, id, document) VALUES (?1, ?2, '{}');",
        [collection, id],
    )
}
