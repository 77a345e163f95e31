//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, uniqueness checks and repository calls into
//!   use-case level operations.
//! - Report every outcome as a typed `ServiceError` or a value.

pub mod classroom_service;
pub mod error;
pub mod uniqueness;
pub mod user_service;
