//! Core domain logic for author accounts.
//! This crate is the single source of truth for author field invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod password;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings};
pub use model::author::{AuthorId, AuthorRecord};
pub use model::validation::{
    sanitize_text, validate_activation_token, validate_avatar_url, validate_email, validate_id,
    validate_id_bytes, validate_password_hash, validate_username, AuthorField, ValidationError,
    ValidationResult,
};
pub use password::{generate_activation_token, Argon2iHasher, HashParams, PasswordError};
pub use repo::author_repo::{AuthorStore, RepoError, RepoResult, SqliteAuthorStore};
pub use service::author_service::{
    AuthorService, RegisterAuthorRequest, ServiceError, ServiceResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
