//! Person records: the shared user profile and its student/teacher variants.
//!
//! # Responsibility
//! - Define the `User` tagged union used wherever students and teachers are
//!   handled as one collection.
//! - Validate required profile fields before persistence.
//!
//! # Invariants
//! - `UserId` values are only unique within one `UserKind`.
//! - Every profile field is required (non-blank).
//! - `social_security_number` is the natural key within one kind.

use crate::model::validation::{natural_key, require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Store-assigned identifier, scoped to one person collection.
pub type UserId = i64;

/// Concrete person variant. Selects the collection a person lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserKind {
    Student,
    Teacher,
}

impl UserKind {
    /// Stable lowercase label used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
        }
    }
}

impl Display for UserKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Namespaced person identifier.
///
/// Unlike a bare `UserId`, a `UserRef` always resolves to at most one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRef {
    pub kind: UserKind,
    pub id: UserId,
}

impl UserRef {
    pub fn student(id: UserId) -> Self {
        Self {
            kind: UserKind::Student,
            id,
        }
    }

    pub fn teacher(id: UserId) -> Self {
        Self {
            kind: UserKind::Teacher,
            id,
        }
    }
}

impl Display for UserRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Fields shared by every user, regardless of variant.
///
/// Also serves as the create/edit candidate: callers hand in a full profile
/// and the store assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub social_security_number: String,
    pub street_address: String,
    pub postal_code: String,
    pub phone: String,
}

impl PersonProfile {
    /// Checks that every required field is non-blank.
    ///
    /// Fields are checked in declaration order; the first blank one is
    /// reported.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("first_name", &self.first_name)?;
        require_text("last_name", &self.last_name)?;
        require_text("email", &self.email)?;
        require_text("social_security_number", &self.social_security_number)?;
        require_text("street_address", &self.street_address)?;
        require_text("postal_code", &self.postal_code)?;
        require_text("phone", &self.phone)?;
        Ok(())
    }

    /// Normalized social security number used for uniqueness checks.
    pub fn ssn_key(&self) -> String {
        natural_key(&self.social_security_number)
    }
}

/// Persisted student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub user_id: UserId,
    #[serde(flatten)]
    pub profile: PersonProfile,
}

/// Persisted teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub user_id: UserId,
    #[serde(flatten)]
    pub profile: PersonProfile,
}

/// A student or a teacher, addressed through the shared user shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum User {
    Student(Student),
    Teacher(Teacher),
}

impl User {
    /// Builds the variant matching `kind`.
    pub fn from_parts(kind: UserKind, user_id: UserId, profile: PersonProfile) -> Self {
        match kind {
            UserKind::Student => Self::Student(Student { user_id, profile }),
            UserKind::Teacher => Self::Teacher(Teacher { user_id, profile }),
        }
    }

    pub fn kind(&self) -> UserKind {
        match self {
            Self::Student(_) => UserKind::Student,
            Self::Teacher(_) => UserKind::Teacher,
        }
    }

    pub fn user_id(&self) -> UserId {
        match self {
            Self::Student(student) => student.user_id,
            Self::Teacher(teacher) => teacher.user_id,
        }
    }

    /// Namespaced reference to this record.
    pub fn user_ref(&self) -> UserRef {
        UserRef {
            kind: self.kind(),
            id: self.user_id(),
        }
    }

    pub fn profile(&self) -> &PersonProfile {
        match self {
            Self::Student(student) => &student.profile,
            Self::Teacher(teacher) => &teacher.profile,
        }
    }

    pub fn profile_mut(&mut self) -> &mut PersonProfile {
        match self {
            Self::Student(student) => &mut student.profile,
            Self::Teacher(teacher) => &mut teacher.profile,
        }
    }

    /// Display name as `first last`.
    pub fn full_name(&self) -> String {
        let profile = self.profile();
        format!("{} {}", profile.first_name.trim(), profile.last_name.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::{PersonProfile, User, UserKind, UserRef};
    use crate::model::validation::ValidationError;

    fn profile() -> PersonProfile {
        PersonProfile {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@westcoast.se".to_string(),
            social_security_number: " 123-45-6789 ".to_string(),
            street_address: "Storgatan 1".to_string(),
            postal_code: "41101".to_string(),
            phone: "031-123456".to_string(),
        }
    }

    #[test]
    fn validate_reports_first_blank_field() {
        let mut candidate = profile();
        candidate.email = " ".to_string();
        candidate.phone = String::new();
        assert_eq!(
            candidate.validate(),
            Err(ValidationError::MissingField("email"))
        );
    }

    #[test]
    fn ssn_key_is_normalized() {
        assert_eq!(profile().ssn_key(), "123-45-6789");
    }

    #[test]
    fn from_parts_selects_variant_by_kind() {
        let teacher = User::from_parts(UserKind::Teacher, 4, profile());
        assert!(matches!(teacher, User::Teacher(_)));
        assert_eq!(teacher.user_ref(), UserRef::teacher(4));

        let mut student = User::from_parts(UserKind::Student, 4, profile());
        assert_eq!(student.kind(), UserKind::Student);
        student.profile_mut().first_name = "Grace".to_string();
        assert_eq!(student.full_name(), "Grace Lovelace");
    }

    #[test]
    fn user_ref_display_is_namespaced() {
        assert_eq!(UserRef::student(7).to_string(), "student:7");
    }
}
