//! Classroom (course) records.
//!
//! # Invariants
//! - `title` is the natural key across all classrooms.
//! - `end` is never earlier than `start` for a persisted classroom.
//! - `teacher_id` is stored as given; it is not checked against teachers.

use crate::model::person::UserId;
use crate::model::validation::{natural_key, require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// Store-assigned classroom identifier.
pub type ClassroomId = i64;

/// Classroom fields without identity. Used as the create/edit candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassroomDetails {
    pub name: String,
    pub title: String,
    /// Unix epoch milliseconds.
    pub start: i64,
    /// Unix epoch milliseconds. Must be >= `start`.
    pub end: i64,
    pub content: String,
    pub schedule: String,
    pub is_on_distance: bool,
    pub avg_grade: f64,
    pub teacher_id: Option<UserId>,
}

impl ClassroomDetails {
    /// Validates required text, the date range and the grade.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("title", &self.title)?;
        require_text("content", &self.content)?;
        require_text("schedule", &self.schedule)?;
        if self.end < self.start {
            return Err(ValidationError::InvalidDateRange {
                start: self.start,
                end: self.end,
            });
        }
        if !self.avg_grade.is_finite() {
            return Err(ValidationError::NotFinite("avg_grade"));
        }
        Ok(())
    }

    /// Normalized title used for uniqueness checks.
    pub fn title_key(&self) -> String {
        natural_key(&self.title)
    }

    /// Copies the editable subset (`name`, `title`, `start`, `end`) from
    /// `source`, leaving the descriptive fields untouched.
    pub fn apply_edit(&mut self, source: &ClassroomDetails) {
        self.name.clone_from(&source.name);
        self.title.clone_from(&source.title);
        self.start = source.start;
        self.end = source.end;
    }
}

/// Persisted classroom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classroom {
    pub classroom_id: ClassroomId,
    #[serde(flatten)]
    pub details: ClassroomDetails,
}

#[cfg(test)]
mod tests {
    use super::ClassroomDetails;
    use crate::model::validation::ValidationError;

    fn details() -> ClassroomDetails {
        ClassroomDetails {
            name: "JB-101".to_string(),
            title: "Java Basics".to_string(),
            start: 1_000,
            end: 2_000,
            content: "Syntax, types, classes".to_string(),
            schedule: "Mon/Wed 09-12".to_string(),
            is_on_distance: false,
            avg_grade: 3.5,
            teacher_id: Some(1),
        }
    }

    #[test]
    fn validate_rejects_reversed_range() {
        let mut candidate = details();
        candidate.end = 500;
        assert_eq!(
            candidate.validate(),
            Err(ValidationError::InvalidDateRange {
                start: 1_000,
                end: 500
            })
        );
    }

    #[test]
    fn validate_rejects_blank_title_and_nan_grade() {
        let mut blank = details();
        blank.title = "  ".to_string();
        assert_eq!(blank.validate(), Err(ValidationError::MissingField("title")));

        let mut nan = details();
        nan.avg_grade = f64::NAN;
        assert_eq!(nan.validate(), Err(ValidationError::NotFinite("avg_grade")));
    }

    #[test]
    fn apply_edit_only_touches_editable_fields() {
        let mut stored = details();
        let edit = ClassroomDetails {
            name: "JB-201".to_string(),
            title: "Java Advanced".to_string(),
            start: 3_000,
            end: 4_000,
            content: "ignored".to_string(),
            schedule: "ignored".to_string(),
            is_on_distance: true,
            avg_grade: 1.0,
            teacher_id: None,
        };

        stored.apply_edit(&edit);
        assert_eq!(stored.title, "Java Advanced");
        assert_eq!(stored.start, 3_000);
        assert_eq!(stored.content, "Syntax, types, classes");
        assert!(!stored.is_on_distance);
        assert_eq!(stored.teacher_id, Some(1));
    }
}
