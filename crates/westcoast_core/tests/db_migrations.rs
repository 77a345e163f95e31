use rusqlite::Connection;
use westcoast_core::db::migrations::latest_version;
use westcoast_core::db::{open_db, open_db_in_memory, DbError};
use westcoast_core::{RepoError, SqliteClassroomRepository, SqlitePersonRepository};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "classrooms");
    assert_table_exists(&conn, "students");
    assert_table_exists(&conn, "teachers");
    assert_index_exists(&conn, "idx_classrooms_title_key");
    assert_index_exists(&conn, "idx_students_ssn_key");
    assert_index_exists(&conn, "idx_teachers_ssn_key");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("westcoast.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "classrooms");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repositories_reject_unmigrated_connections() {
    let conn = Connection::open_in_memory().unwrap();

    let classroom_err = SqliteClassroomRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        classroom_err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));

    let person_err = SqlitePersonRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        person_err,
        RepoError::UninitializedConnection { .. }
    ));
}

#[test]
fn records_survive_reopening_a_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.db");

    {
        let conn = open_db(&path).unwrap();
        conn.execute(
            "INSERT INTO teachers (
                first_name, last_name, email, social_security_number, ssn_key,
                street_address, postal_code, phone
            ) VALUES ('Alan', 'Turing', 'alan@westcoast.se', '19120623-0000',
                      '19120623-0000', 'Bletchley 1', '41102', '031-000000');",
            [],
        )
        .unwrap();
    }

    let conn = open_db(&path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM teachers;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert_schema_object(conn, "table", table_name);
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert_schema_object(conn, "index", index_name);
}

fn assert_schema_object(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
