//! Core record management for Westcoast Education.
//! This crate is the single source of truth for classroom and user
//! invariants; presentation layers call into it and render the outcome.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::classroom::{Classroom, ClassroomDetails, ClassroomId};
pub use model::person::{PersonProfile, Student, Teacher, User, UserId, UserKind, UserRef};
pub use model::validation::ValidationError;
pub use repo::classroom_repo::{ClassroomRepository, SqliteClassroomRepository};
pub use repo::person_repo::{PersonRepository, SqlitePersonRepository};
pub use repo::store::{Collection, RecordRef, RepoError, RepoResult};
pub use service::classroom_service::ClassroomService;
pub use service::error::{Conflict, ServiceError, ServiceResult};
pub use service::uniqueness::{UniquenessCheck, UniquenessValidator};
pub use service::user_service::{UserCounts, UserService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
