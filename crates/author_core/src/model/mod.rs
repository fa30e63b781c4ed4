//! Author domain model and field validation.
//!
//! # Responsibility
//! - Define the validated `AuthorRecord` entity.
//! - Keep field rules in one module of pure functions shared by the entity,
//!   the repository and the service layer.
//!
//! # Invariants
//! - No `AuthorRecord` exists whose fields have not passed validation.

pub mod author;
pub mod validation;
