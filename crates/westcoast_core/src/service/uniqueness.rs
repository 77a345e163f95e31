//! Natural-key uniqueness checks run before inserts and edits.
//!
//! # Invariants
//! - Keys are compared after trimming and case-folding.
//! - A collision is reported as `UniquenessCheck::Conflict`, not as an error;
//!   only store failures produce `Err`.
//! - Person checks never look across kinds.

use crate::model::classroom::ClassroomId;
use crate::model::person::{UserId, UserKind};
use crate::model::validation::natural_key;
use crate::repo::classroom_repo::ClassroomRepository;
use crate::repo::person_repo::PersonRepository;
use crate::repo::store::RepoResult;

/// Result of a uniqueness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniquenessCheck {
    Unique,
    /// Another record already holds the key; carries its stored value.
    Conflict { existing: String },
}

/// Uniqueness checks over one repository.
pub struct UniquenessValidator<'r, R> {
    repo: &'r R,
}

impl<'r, R> UniquenessValidator<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }
}

impl<R: ClassroomRepository> UniquenessValidator<'_, R> {
    /// Checks `title` against every classroom except `exclude`.
    pub fn check_classroom_title_unique(
        &self,
        title: &str,
        exclude: Option<ClassroomId>,
    ) -> RepoResult<UniquenessCheck> {
        let existing = self
            .repo
            .find_classroom_by_title_key(&natural_key(title), exclude)?;
        Ok(match existing {
            Some(classroom) => UniquenessCheck::Conflict {
                existing: classroom.details.title,
            },
            None => UniquenessCheck::Unique,
        })
    }
}

impl<R: PersonRepository> UniquenessValidator<'_, R> {
    /// Checks `ssn` against every person of `kind` except `exclude`.
    pub fn check_person_ssn_unique(
        &self,
        kind: UserKind,
        ssn: &str,
        exclude: Option<UserId>,
    ) -> RepoResult<UniquenessCheck> {
        let existing = self
            .repo
            .find_person_by_ssn_key(kind, &natural_key(ssn), exclude)?;
        Ok(match existing {
            Some(user) => UniquenessCheck::Conflict {
                existing: user.profile().social_security_number.clone(),
            },
            None => UniquenessCheck::Unique,
        })
    }
}
