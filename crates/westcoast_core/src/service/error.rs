//! Outcome taxonomy shared by the classroom and user services.

use crate::model::validation::ValidationError;
use crate::repo::store::{Collection, RecordRef, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Natural-key collision reported on create or edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// Collection holding the existing record.
    pub collection: Collection,
    /// Natural-key field that collided (`title` or `social_security_number`).
    pub field: &'static str,
    /// Stored value of the existing record's natural key. Falls back to the
    /// normalized key when the store rejected a write and the colliding
    /// record could not be read back.
    pub existing: String,
}

impl Conflict {
    /// Builds a conflict on the natural key of `collection`.
    pub fn on(collection: Collection, existing: impl Into<String>) -> Self {
        Self {
            collection,
            field: natural_key_field(collection),
            existing: existing.into(),
        }
    }
}

impl Display for Conflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} `{}` is already registered in {}",
            self.field, self.existing, self.collection
        )
    }
}

/// Service error returned by every core operation.
#[derive(Debug)]
pub enum ServiceError {
    /// Candidate is missing a required field or holds an invalid value.
    Validation(ValidationError),
    /// Candidate collides with an existing natural key.
    Conflict(Conflict),
    /// Target record does not exist.
    NotFound(RecordRef),
    /// Store failure unrelated to business rules.
    Repo(RepoError),
}

impl ServiceError {
    /// Whether this is an infrastructure failure rather than a business
    /// outcome.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Repo(_))
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "validation failed: {err}"),
            Self::Conflict(conflict) => write!(f, "{conflict}"),
            Self::NotFound(record) => write!(f, "not found: {record}"),
            Self::Repo(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(record) => Self::NotFound(record),
            RepoError::UniqueViolation { collection, key } => {
                Self::Conflict(Conflict::on(collection, key))
            }
            other => Self::Repo(other),
        }
    }
}

fn natural_key_field(collection: Collection) -> &'static str {
    match collection {
        Collection::Classrooms => "title",
        Collection::Students | Collection::Teachers => "social_security_number",
    }
}

#[cfg(test)]
mod tests {
    use super::{Conflict, ServiceError};
    use crate::repo::store::{Collection, RecordRef, RepoError};

    #[test]
    fn unique_violation_maps_to_conflict() {
        let err = ServiceError::from(RepoError::UniqueViolation {
            collection: Collection::Teachers,
            key: "123-45-6789".to_string(),
        });
        match err {
            ServiceError::Conflict(conflict) => {
                assert_eq!(conflict.field, "social_security_number");
                assert_eq!(conflict.existing, "123-45-6789");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn not_found_is_not_infrastructure() {
        let err = ServiceError::from(RepoError::NotFound(RecordRef::Classroom(2)));
        assert!(matches!(err, ServiceError::NotFound(RecordRef::Classroom(2))));
        assert!(!err.is_infrastructure());

        let infra = ServiceError::from(RepoError::InvalidData("bad row".to_string()));
        assert!(infra.is_infrastructure());
    }

    #[test]
    fn conflict_message_names_the_value() {
        let conflict = Conflict::on(Collection::Classrooms, "Java Basics");
        assert_eq!(
            conflict.to_string(),
            "title `Java Basics` is already registered in classrooms"
        );
    }
}
