//! Repository layer: the entity store behind every core operation.
//!
//! # Responsibility
//! - Define collection-oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate records before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `UniqueViolation`)
//!   in addition to DB transport errors.
//! - Identifiers are assigned per collection and never reused.

pub mod classroom_repo;
pub mod person_repo;
pub mod store;
