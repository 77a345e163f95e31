//! Field validation shared by classroom and person records.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Record-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty or whitespace-only.
    MissingField(&'static str),
    /// `end` is earlier than `start`.
    InvalidDateRange { start: i64, end: i64 },
    /// Numeric field holds NaN or infinity.
    NotFinite(&'static str),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "required field `{field}` is empty"),
            Self::InvalidDateRange { start, end } => {
                write!(f, "end ({end}) must not be earlier than start ({start})")
            }
            Self::NotFinite(field) => write!(f, "field `{field}` must be a finite number"),
        }
    }
}

impl Error for ValidationError {}

/// Rejects empty or whitespace-only values for a required field.
pub fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// Normalizes a natural key for uniqueness comparison.
///
/// Leading/trailing whitespace is dropped and the remainder is uppercased,
/// so `" Java Basics "` and `"java basics"` map to the same key.
///
/// Uppercasing is context-free per character, unlike `to_lowercase`, which
/// maps a word-final `Σ` to `ς` and would split `"ΟΔΟΣ"` from `"οδοσ"`.
pub fn natural_key(value: &str) -> String {
    value.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::{natural_key, require_text, ValidationError};

    #[test]
    fn natural_key_trims_and_case_folds() {
        assert_eq!(natural_key("  Java Basics "), "JAVA BASICS");
        assert_eq!(natural_key("åsa\t"), "ÅSA");
        assert_eq!(natural_key("123-45-6789"), natural_key(" 123-45-6789 "));
    }

    #[test]
    fn natural_key_folds_final_sigma() {
        assert_eq!(natural_key("ΟΔΟΣ"), natural_key("οδοσ"));
        assert_eq!(natural_key("ΟΔΟΣ"), natural_key("οδος"));
        assert_eq!(natural_key("Straße"), natural_key("STRASSE"));
    }

    #[test]
    fn natural_key_keeps_inner_whitespace() {
        assert_ne!(natural_key("java basics"), natural_key("java  basics"));
    }

    #[test]
    fn require_text_rejects_blank_values() {
        assert_eq!(
            require_text("email", "   "),
            Err(ValidationError::MissingField("email"))
        );
        assert!(require_text("email", "a@b.se").is_ok());
    }
}
