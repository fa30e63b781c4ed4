//! Author use-case service.
//!
//! # Responsibility
//! - Register new authors with a generated id, activation token and Argon2i hash.
//! - Complete account activation by clearing the activation token.
//! - Delegate plain CRUD to the store.
//!
//! # Invariants
//! - Service APIs never bypass entity validation or store contracts.
//! - Service layer remains storage-agnostic.
//! - Plaintext passwords and tokens are never logged.

use crate::model::author::{AuthorId, AuthorRecord};
use crate::model::validation::{
    validate_activation_token, validate_avatar_url, validate_email, validate_username,
    ValidationError,
};
use crate::password::{generate_activation_token, Argon2iHasher, PasswordError};
use crate::repo::author_repo::{AuthorStore, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for author use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Validation or persistence failure, surfaced unchanged.
    Repo(RepoError),
    Password(PasswordError),
    /// Supplied activation token does not match the stored one.
    TokenMismatch(AuthorId),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Password(err) => write!(f, "{err}"),
            Self::TokenMismatch(id) => write!(f, "activation token mismatch for author {id}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Password(err) => Some(err),
            Self::TokenMismatch(_) => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Repo(RepoError::Validation(value))
    }
}

impl From<PasswordError> for ServiceError {
    fn from(value: PasswordError) -> Self {
        Self::Password(value)
    }
}

/// Request model for registering a new author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterAuthorRequest {
    pub email: String,
    /// Plaintext password; hashed before the record is built.
    pub password: String,
    pub avatar_url: String,
    pub username: String,
}

/// Use-case service wrapper for author operations.
pub struct AuthorService<S: AuthorStore> {
    store: S,
    hasher: Argon2iHasher,
}

impl<S: AuthorStore> AuthorService<S> {
    pub fn new(store: S, hasher: Argon2iHasher) -> Self {
        Self { store, hasher }
    }

    /// Registers a new, not yet activated author.
    ///
    /// # Contract
    /// - Generates a random v4 id and a 32-hex activation token.
    /// - Stores only the Argon2i hash of `request.password`.
    /// - Text fields are validated before the password is hashed.
    /// - Returns the persisted record.
    pub fn register(&self, request: &RegisterAuthorRequest) -> ServiceResult<AuthorRecord> {
        let email = validate_email(&request.email)?;
        let avatar_url = validate_avatar_url(&request.avatar_url)?;
        let username = validate_username(&request.username)?;

        let password_hash = self.hasher.hash_password(&request.password)?;
        let token = generate_activation_token();

        let author = AuthorRecord::with_id(
            Uuid::new_v4(),
            Some(token.as_str()),
            &email,
            &password_hash,
            &avatar_url,
            &username,
        )?;
        self.store.insert(&author)?;

        info!(
            "event=author_register module=service status=ok author_id={}",
            author.id()
        );
        Ok(author)
    }

    /// Clears the activation token when `token` matches the stored one.
    ///
    /// Activating an already-activated author is a no-op.
    pub fn activate(&self, id: AuthorId, token: &str) -> ServiceResult<AuthorRecord> {
        let mut author = self
            .store
            .find_by_id(id)?
            .ok_or(RepoError::NotFound(id))?;

        let Some(stored) = author.activation_token() else {
            return Ok(author);
        };

        let supplied = validate_activation_token(Some(token))?;
        if supplied.as_deref() != Some(stored) {
            info!("event=author_activate module=service status=rejected author_id={id}");
            return Err(ServiceError::TokenMismatch(id));
        }

        author.set_activation_token(None)?;
        self.store.update(&author)?;

        info!("event=author_activate module=service status=ok author_id={id}");
        Ok(author)
    }

    /// Persists all mutable fields of an existing author.
    pub fn update(&self, author: &AuthorRecord) -> ServiceResult<()> {
        Ok(self.store.update(author)?)
    }

    pub fn delete(&self, id: AuthorId) -> ServiceResult<()> {
        Ok(self.store.delete(id)?)
    }

    pub fn get(&self, id: AuthorId) -> ServiceResult<Option<AuthorRecord>> {
        Ok(self.store.find_by_id(id)?)
    }

    pub fn find_by_email(&self, email: &str) -> ServiceResult<Option<AuthorRecord>> {
        Ok(self.store.find_by_email(email)?)
    }

    pub fn find_by_username(&self, pattern: &str) -> ServiceResult<Vec<AuthorRecord>> {
        Ok(self.store.find_by_username(pattern)?)
    }

    pub fn list(&self) -> ServiceResult<Vec<AuthorRecord>> {
        Ok(self.store.find_all()?)
    }
}
