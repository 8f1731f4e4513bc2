use lifeos_core::db::migrations::latest_version;
use lifeos_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().expect("in-memory db should open");

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "kv_slots");
}

#[test]
fn reopening_file_database_keeps_slots() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("lifeos.sqlite3");

    let first = open_db(&path).expect("db file should open");
    first
        .execute(
            "INSERT INTO kv_slots (slot_key, slot_value) VALUES ('k', 'v');",
            [],
        )
        .expect("seed row should insert");
    drop(first);

    let second = open_db(&path).expect("db file should open");
    assert_eq!(schema_version(&second), latest_version());
    let value: String = second
        .query_row("SELECT slot_value FROM kv_slots WHERE slot_key = 'k';", [], |row| {
            row.get(0)
        })
        .expect("seeded slot should survive reopen");
    assert_eq!(value, "v");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).expect("raw connection should open");
    conn.execute_batch("PRAGMA user_version = 999;").expect("user_version should be writable");
    drop(conn);

    let err = open_db(&path).expect_err("newer schema should be refused");
    assert_eq!(err.code(), "db_schema_too_new");
    match err {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn opening_a_directory_reports_open_failure() {
    let dir = tempfile::tempdir().expect("temp dir should be created");

    let err = open_db(dir.path()).expect_err("a directory is not a database file");
    assert!(
        matches!(err, DbError::Open { .. } | DbError::Sqlite(_)),
        "unexpected error: {err}"
    );
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .expect("user_version should be readable")
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .expect("sqlite_master should be queryable");
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
