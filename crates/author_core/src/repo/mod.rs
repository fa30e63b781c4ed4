//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the author persistence contract used by the service layer.
//! - Isolate SQLite query details from use-case orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `Conflict`) in
//!   addition to DB transport errors.

pub mod author_repo;
