//! Domain model for classrooms and the people attached to them.
//!
//! # Responsibility
//! - Define the records handed to and returned from core operations.
//! - Own field-level validation and natural-key normalization.
//!
//! # Invariants
//! - Students and teachers share one profile shape but live in separate
//!   collections with independent id spaces.
//! - Natural keys compare equal after trimming and case-folding.

pub mod classroom;
pub mod person;
pub mod validation;
