//! Person repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `students` and `teachers` collections.
//! - Return rows as the `User` tagged union of the addressed kind.
//!
//! # Invariants
//! - Each kind is a separate table with its own id sequence.
//! - `ssn_key` is unique per table, never across tables.
//! - Write paths call `PersonProfile::validate()` before SQL mutations.

use crate::model::person::{PersonProfile, User, UserId, UserKind, UserRef};
use crate::repo::store::{
    ensure_connection_ready, map_write_error, run_atomically, Collection, RecordRef, RepoError,
    RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

const PERSON_COLUMNS: &str = "user_id,
    first_name,
    last_name,
    email,
    social_security_number,
    street_address,
    postal_code,
    phone";

/// Repository interface for student/teacher persistence.
///
/// Every operation is addressed by `UserKind`; there is no shared id space.
pub trait PersonRepository {
    /// Lists every person of `kind` in store order.
    fn list_people(&self, kind: UserKind) -> RepoResult<Vec<User>>;
    /// Counts persons of `kind` without loading rows.
    fn count_people(&self, kind: UserKind) -> RepoResult<usize>;
    /// Loads one person of `kind` by id.
    fn get_person(&self, kind: UserKind, id: UserId) -> RepoResult<Option<User>>;
    /// Finds a person of `kind` whose normalized SSN equals `ssn_key`,
    /// skipping `exclude` when given.
    fn find_person_by_ssn_key(
        &self,
        kind: UserKind,
        ssn_key: &str,
        exclude: Option<UserId>,
    ) -> RepoResult<Option<User>>;
    /// Inserts a person into the `kind` collection and returns its id.
    fn create_person(&self, kind: UserKind, profile: &PersonProfile) -> RepoResult<UserId>;
    /// Overwrites every profile field of an existing person.
    fn update_person(&self, kind: UserKind, id: UserId, profile: &PersonProfile)
        -> RepoResult<()>;
    /// Removes a person permanently.
    fn delete_person(&self, kind: UserKind, id: UserId) -> RepoResult<()>;
    /// Runs `op` as one unit of work.
    fn atomically<T, E>(&self, op: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<RepoError>;
}

/// SQLite-backed person repository covering both kinds.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["students", "teachers"])?;
        Ok(Self { conn })
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn list_people(&self, kind: UserKind) -> RepoResult<Vec<User>> {
        let table = table_for(kind);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PERSON_COLUMNS} FROM {table} ORDER BY user_id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut people = Vec::new();
        while let Some(row) = rows.next()? {
            people.push(parse_person_row(kind, row)?);
        }
        Ok(people)
    }

    fn count_people(&self, kind: UserKind) -> RepoResult<usize> {
        let table = table_for(kind);
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
                row.get(0)
            })?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count in {table}")))
    }

    fn get_person(&self, kind: UserKind, id: UserId) -> RepoResult<Option<User>> {
        let table = table_for(kind);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PERSON_COLUMNS} FROM {table} WHERE user_id = ?1;"
        ))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_row(kind, row)?));
        }
        Ok(None)
    }

    fn find_person_by_ssn_key(
        &self,
        kind: UserKind,
        ssn_key: &str,
        exclude: Option<UserId>,
    ) -> RepoResult<Option<User>> {
        let table = table_for(kind);
        let found_id: Option<UserId> = self
            .conn
            .query_row(
                &format!(
                    "SELECT user_id
                     FROM {table}
                     WHERE ssn_key = ?1
                       AND (?2 IS NULL OR user_id <> ?2)
                     LIMIT 1;"
                ),
                params![ssn_key, exclude],
                |row| row.get(0),
            )
            .optional()?;

        match found_id {
            Some(id) => self.get_person(kind, id),
            None => Ok(None),
        }
    }

    fn create_person(&self, kind: UserKind, profile: &PersonProfile) -> RepoResult<UserId> {
        profile.validate()?;
        let table = table_for(kind);
        let ssn_key = profile.ssn_key();

        self.conn
            .execute(
                &format!(
                    "INSERT INTO {table} (
                        first_name,
                        last_name,
                        email,
                        social_security_number,
                        ssn_key,
                        street_address,
                        postal_code,
                        phone
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);"
                ),
                params![
                    profile.first_name.as_str(),
                    profile.last_name.as_str(),
                    profile.email.as_str(),
                    profile.social_security_number.as_str(),
                    ssn_key.as_str(),
                    profile.street_address.as_str(),
                    profile.postal_code.as_str(),
                    profile.phone.as_str(),
                ],
            )
            .map_err(|err| map_write_error(err, Collection::from(kind), &ssn_key))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_person(
        &self,
        kind: UserKind,
        id: UserId,
        profile: &PersonProfile,
    ) -> RepoResult<()> {
        profile.validate()?;
        let table = table_for(kind);
        let ssn_key = profile.ssn_key();

        let changed = self
            .conn
            .execute(
                &format!(
                    "UPDATE {table}
                     SET
                        first_name = ?1,
                        last_name = ?2,
                        email = ?3,
                        social_security_number = ?4,
                        ssn_key = ?5,
                        street_address = ?6,
                        postal_code = ?7,
                        phone = ?8
                     WHERE user_id = ?9;"
                ),
                params![
                    profile.first_name.as_str(),
                    profile.last_name.as_str(),
                    profile.email.as_str(),
                    profile.social_security_number.as_str(),
                    ssn_key.as_str(),
                    profile.street_address.as_str(),
                    profile.postal_code.as_str(),
                    profile.phone.as_str(),
                    id,
                ],
            )
            .map_err(|err| map_write_error(err, Collection::from(kind), &ssn_key))?;

        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::User(UserRef { kind, id })));
        }
        Ok(())
    }

    fn delete_person(&self, kind: UserKind, id: UserId) -> RepoResult<()> {
        let table = table_for(kind);
        let changed = self
            .conn
            .execute(&format!("DELETE FROM {table} WHERE user_id = ?1;"), [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::User(UserRef { kind, id })));
        }
        Ok(())
    }

    fn atomically<T, E>(&self, op: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<RepoError>,
    {
        run_atomically(self.conn, op)
    }
}

fn table_for(kind: UserKind) -> &'static str {
    Collection::from(kind).table_name()
}

fn parse_person_row(kind: UserKind, row: &Row<'_>) -> RepoResult<User> {
    let profile = PersonProfile {
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        social_security_number: row.get("social_security_number")?,
        street_address: row.get("street_address")?,
        postal_code: row.get("postal_code")?,
        phone: row.get("phone")?,
    };
    Ok(User::from_parts(kind, row.get("user_id")?, profile))
}
