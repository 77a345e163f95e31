//! Shared persistence plumbing for the record repositories.
//!
//! # Responsibility
//! - Define the repository error surface and collection addressing.
//! - Run a validation read and its write inside one immediate transaction.
//! - Verify that a connection carries the migrated schema.
//!
//! # Invariants
//! - A failed unit of work is rolled back; nothing is partially written.
//! - Unique-index violations surface as `RepoError::UniqueViolation`, never
//!   as an opaque SQLite error.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::classroom::ClassroomId;
use crate::model::person::{UserId, UserKind, UserRef};
use crate::model::validation::ValidationError;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// One independently addressed record collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Classrooms,
    Students,
    Teachers,
}

impl Collection {
    pub fn table_name(self) -> &'static str {
        match self {
            Self::Classrooms => "classrooms",
            Self::Students => "students",
            Self::Teachers => "teachers",
        }
    }
}

impl From<UserKind> for Collection {
    fn from(value: UserKind) -> Self {
        match value {
            UserKind::Student => Self::Students,
            UserKind::Teacher => Self::Teachers,
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Identity of one stored record across all collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordRef {
    Classroom(ClassroomId),
    User(UserRef),
    /// Bare user id that matched neither teachers nor students.
    AnyUser(UserId),
}

impl Display for RecordRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Classroom(id) => write!(f, "classroom:{id}"),
            Self::User(user_ref) => write!(f, "{user_ref}"),
            Self::AnyUser(id) => write!(f, "user:{id}"),
        }
    }
}

/// Repository error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Record failed field validation; nothing was written.
    Validation(ValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target record does not exist.
    NotFound(RecordRef),
    /// Store-level unique index rejected a natural key.
    UniqueViolation { collection: Collection, key: String },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted row cannot be converted into a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(record) => write!(f, "record not found: {record}"),
            Self::UniqueViolation { collection, key } => {
                write!(f, "natural key `{key}` already exists in {collection}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Runs `op` inside an immediate transaction on `conn`.
///
/// Commits when `op` succeeds; otherwise the transaction is dropped and
/// rolled back. Must not be nested on the same connection.
pub(crate) fn run_atomically<T, E>(
    conn: &Connection,
    op: impl FnOnce() -> Result<T, E>,
) -> Result<T, E>
where
    E: From<RepoError>,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(RepoError::from)?;
    let value = op()?;
    tx.commit().map_err(RepoError::from)?;
    Ok(value)
}

/// Maps a write error, turning unique-index violations into
/// `RepoError::UniqueViolation` for `collection`/`key`.
pub(crate) fn map_write_error(
    err: rusqlite::Error,
    collection: Collection,
    key: &str,
) -> RepoError {
    if is_unique_violation(&err) {
        return RepoError::UniqueViolation {
            collection,
            key: key.to_string(),
        };
    }
    err.into()
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Checks schema version and required tables before a repository uses
/// `conn`.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    tables: &[&'static str],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

pub(crate) fn int_to_bool(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::{ensure_connection_ready, run_atomically, Collection, RecordRef, RepoError};
    use crate::db::open_db_in_memory;
    use crate::model::person::{UserKind, UserRef};
    use rusqlite::Connection;

    #[test]
    fn collection_follows_user_kind() {
        assert_eq!(Collection::from(UserKind::Student), Collection::Students);
        assert_eq!(Collection::from(UserKind::Teacher).table_name(), "teachers");
    }

    #[test]
    fn record_ref_display_names_collection() {
        assert_eq!(RecordRef::Classroom(3).to_string(), "classroom:3");
        assert_eq!(RecordRef::User(UserRef::teacher(1)).to_string(), "teacher:1");
        assert_eq!(RecordRef::AnyUser(9).to_string(), "user:9");
    }

    #[test]
    fn run_atomically_rolls_back_on_error() {
        let conn = open_db_in_memory().unwrap();
        let result: Result<(), RepoError> = run_atomically(&conn, || {
            conn.execute(
                "INSERT INTO classrooms (name, title, title_key, start_ms, end_ms, content, schedule)
                 VALUES ('a', 'b', 'b', 0, 0, 'c', 'd');",
                [],
            )?;
            Err(RepoError::InvalidData("forced".to_string()))
        });
        assert!(result.is_err());

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM classrooms;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn unmigrated_connection_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        let err = ensure_connection_ready(&conn, &["classrooms"]).unwrap_err();
        assert!(matches!(
            err,
            RepoError::UninitializedConnection {
                actual_version: 0,
                ..
            }
        ));
    }
}
