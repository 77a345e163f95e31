//! Classroom repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `classrooms` collection.
//! - Maintain the normalized `title_key` column behind the unique index.
//!
//! # Invariants
//! - Write paths call `ClassroomDetails::validate()` before SQL mutations.
//! - `update_classroom` is a full replace of every stored field.
//! - Listing follows store order (`classroom_id ASC`).

use crate::model::classroom::{Classroom, ClassroomDetails, ClassroomId};
use crate::repo::store::{
    bool_to_int, ensure_connection_ready, int_to_bool, map_write_error, run_atomically,
    Collection, RecordRef, RepoError, RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

const CLASSROOM_SELECT_SQL: &str = "SELECT
    classroom_id,
    name,
    title,
    start_ms,
    end_ms,
    content,
    schedule,
    is_on_distance,
    avg_grade,
    teacher_id
FROM classrooms";

/// Repository interface for classroom persistence.
pub trait ClassroomRepository {
    /// Lists every classroom in store order.
    fn list_classrooms(&self) -> RepoResult<Vec<Classroom>>;
    /// Loads one classroom by id.
    fn get_classroom(&self, id: ClassroomId) -> RepoResult<Option<Classroom>>;
    /// Finds a classroom whose normalized title equals `title_key`,
    /// skipping `exclude` when given.
    fn find_classroom_by_title_key(
        &self,
        title_key: &str,
        exclude: Option<ClassroomId>,
    ) -> RepoResult<Option<Classroom>>;
    /// Inserts a classroom and returns the assigned id.
    fn create_classroom(&self, details: &ClassroomDetails) -> RepoResult<ClassroomId>;
    /// Overwrites every field of an existing classroom.
    fn update_classroom(&self, id: ClassroomId, details: &ClassroomDetails) -> RepoResult<()>;
    /// Removes a classroom permanently.
    fn delete_classroom(&self, id: ClassroomId) -> RepoResult<()>;
    /// Runs `op` as one unit of work; all reads and writes inside either
    /// commit together or not at all.
    fn atomically<T, E>(&self, op: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<RepoError>;
}

/// SQLite-backed classroom repository.
pub struct SqliteClassroomRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteClassroomRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["classrooms"])?;
        Ok(Self { conn })
    }
}

impl ClassroomRepository for SqliteClassroomRepository<'_> {
    fn list_classrooms(&self) -> RepoResult<Vec<Classroom>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CLASSROOM_SELECT_SQL} ORDER BY classroom_id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut classrooms = Vec::new();
        while let Some(row) = rows.next()? {
            classrooms.push(parse_classroom_row(row)?);
        }
        Ok(classrooms)
    }

    fn get_classroom(&self, id: ClassroomId) -> RepoResult<Option<Classroom>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CLASSROOM_SELECT_SQL} WHERE classroom_id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_classroom_row(row)?));
        }
        Ok(None)
    }

    fn find_classroom_by_title_key(
        &self,
        title_key: &str,
        exclude: Option<ClassroomId>,
    ) -> RepoResult<Option<Classroom>> {
        let found_id: Option<ClassroomId> = self
            .conn
            .query_row(
                "SELECT classroom_id
                 FROM classrooms
                 WHERE title_key = ?1
                   AND (?2 IS NULL OR classroom_id <> ?2)
                 LIMIT 1;",
                params![title_key, exclude],
                |row| row.get(0),
            )
            .optional()?;

        match found_id {
            Some(id) => self.get_classroom(id),
            None => Ok(None),
        }
    }

    fn create_classroom(&self, details: &ClassroomDetails) -> RepoResult<ClassroomId> {
        details.validate()?;
        let title_key = details.title_key();

        self.conn
            .execute(
                "INSERT INTO classrooms (
                    name,
                    title,
                    title_key,
                    start_ms,
                    end_ms,
                    content,
                    schedule,
                    is_on_distance,
                    avg_grade,
                    teacher_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
                params![
                    details.name.as_str(),
                    details.title.as_str(),
                    title_key.as_str(),
                    details.start,
                    details.end,
                    details.content.as_str(),
                    details.schedule.as_str(),
                    bool_to_int(details.is_on_distance),
                    details.avg_grade,
                    details.teacher_id,
                ],
            )
            .map_err(|err| map_write_error(err, Collection::Classrooms, &title_key))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_classroom(&self, id: ClassroomId, details: &ClassroomDetails) -> RepoResult<()> {
        details.validate()?;
        let title_key = details.title_key();

        let changed = self
            .conn
            .execute(
                "UPDATE classrooms
                 SET
                    name = ?1,
                    title = ?2,
                    title_key = ?3,
                    start_ms = ?4,
                    end_ms = ?5,
                    content = ?6,
                    schedule = ?7,
                    is_on_distance = ?8,
                    avg_grade = ?9,
                    teacher_id = ?10
                 WHERE classroom_id = ?11;",
                params![
                    details.name.as_str(),
                    details.title.as_str(),
                    title_key.as_str(),
                    details.start,
                    details.end,
                    details.content.as_str(),
                    details.schedule.as_str(),
                    bool_to_int(details.is_on_distance),
                    details.avg_grade,
                    details.teacher_id,
                    id,
                ],
            )
            .map_err(|err| map_write_error(err, Collection::Classrooms, &title_key))?;

        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Classroom(id)));
        }
        Ok(())
    }

    fn delete_classroom(&self, id: ClassroomId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM classrooms WHERE classroom_id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Classroom(id)));
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

fn parse_classroom_row(row: &Row<'_>) -> RepoResult<Classroom> {
    let is_on_distance = int_to_bool(
        row.get("is_on_distance")?,
        "classrooms.is_on_distance",
    )?;

    Ok(Classroom {
        classroom_id: row.get("classroom_id")?,
        details: ClassroomDetails {
            name: row.get("name")?,
            title: row.get("title")?,
            start: row.get("start_ms")?,
            end: row.get("end_ms")?,
            content: row.get("content")?,
            schedule: row.get("schedule")?,
            is_on_distance,
            avg_grade: row.get("avg_grade")?,
            teacher_id: row.get("teacher_id")?,
        },
    })
}
