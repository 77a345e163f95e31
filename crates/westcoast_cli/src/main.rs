//! CLI probe for the record core.
//!
//! # Responsibility
//! - Verify `westcoast_core` linkage and open the configured database.
//! - Print a deterministic summary of stored records followed by the
//!   classroom catalogue, one line per classroom.
//!
//! Environment:
//! - `WESTCOAST_DB_PATH`: database file (defaults to the system temp dir).
//! - `WESTCOAST_LOG_DIR`: absolute log directory; logging is off when unset.
//! - `WESTCOAST_LOG_LEVEL`: log level (defaults to the build-mode default).

use log::info;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use westcoast_core::db::open_db;
use westcoast_core::{
    Classroom, ClassroomService, SqliteClassroomRepository, SqlitePersonRepository, UserService,
};

const DEFAULT_DB_FILE_NAME: &str = "westcoast.sqlite3";

fn main() -> ExitCode {
    println!("westcoast_core ping={}", westcoast_core::ping());
    println!("westcoast_core version={}", westcoast_core::core_version());

    if let Err(message) = init_logging_from_env() {
        eprintln!("logging disabled: {message}");
    }

    match summarize(&resolve_db_path()) {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn summarize(db_path: &Path) -> Result<String, String> {
    let conn = open_db(db_path).map_err(|err| format!("db open failed: {err}"))?;

    let catalogue = SqliteClassroomRepository::try_new(&conn)
        .map(ClassroomService::new)
        .map_err(|err| format!("classroom repo init failed: {err}"))?
        .classroom_catalogue()
        .map_err(|err| err.to_string())?;
    let counts = SqlitePersonRepository::try_new(&conn)
        .map(UserService::new)
        .map_err(|err| format!("person repo init failed: {err}"))?
        .count_users()
        .map_err(|err| err.to_string())?;

    info!(
        "event=cli_summary module=cli status=ok classrooms={} teachers={} students={}",
        catalogue.len(),
        counts.teachers,
        counts.students
    );

    let mut lines = vec![format!(
        "db={} classrooms={} teachers={} students={}",
        db_path.display(),
        catalogue.len(),
        counts.teachers,
        counts.students
    )];
    lines.extend(catalogue.iter().map(catalogue_line));
    Ok(lines.join("\n"))
}

fn catalogue_line(classroom: &Classroom) -> String {
    format!(
        "classroom id={} start={} title={}",
        classroom.classroom_id, classroom.details.start, classroom.details.title
    )
}

fn init_logging_from_env() -> Result<(), String> {
    let Some(log_dir) = non_empty_env("WESTCOAST_LOG_DIR") else {
        return Ok(());
    };
    let level = non_empty_env("WESTCOAST_LOG_LEVEL")
        .unwrap_or_else(|| westcoast_core::default_log_level().to_string());
    westcoast_core::init_logging(&level, &log_dir).map_err(|err| err.to_string())
}

fn resolve_db_path() -> PathBuf {
    non_empty_env("WESTCOAST_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}
