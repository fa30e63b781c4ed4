//! Author domain model.
//!
//! # Responsibility
//! - Hold one validated author record and expose read accessors.
//! - Route every mutation through the same validator the constructor uses.
//!
//! # Invariants
//! - `id` is stable, non-nil and never changes after construction.
//! - Fields are only replaced when the new value passes validation; a failed
//!   setter leaves the previous value in place.
//! - Password hash and activation token never appear in serialized output.

use crate::model::validation::{
    validate_activation_token, validate_avatar_url, validate_email, validate_id,
    validate_password_hash, validate_username, validate_uuid, ValidationResult,
};
use serde::Serialize;
use uuid::Uuid;

/// Stable identifier of an author row.
pub type AuthorId = Uuid;

/// Validated author entity mapped to one `author` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorRecord {
    #[serde(rename = "authorId")]
    id: AuthorId,
    #[serde(skip_serializing)]
    activation_token: Option<String>,
    #[serde(rename = "authorEmail")]
    email: String,
    #[serde(skip_serializing)]
    password_hash: String,
    #[serde(rename = "authorAvatarUrl")]
    avatar_url: String,
    #[serde(rename = "authorUsername")]
    username: String,
}

impl AuthorRecord {
    /// Builds a record from raw inputs.
    ///
    /// Validators run in field order (id, activation token, email, password
    /// hash, avatar url, username) and the first failure is returned as is.
    pub fn try_new(
        id: &str,
        activation_token: Option<&str>,
        email: &str,
        password_hash: &str,
        avatar_url: &str,
        username: &str,
    ) -> ValidationResult<Self> {
        let id = validate_id(id)?;
        Self::with_id(
            id,
            activation_token,
            email,
            password_hash,
            avatar_url,
            username,
        )
    }

    /// Builds a record around an already-typed id.
    ///
    /// Used by registration and row rehydration. The id still goes through the
    /// id check so the nil UUID cannot slip in.
    pub fn with_id(
        id: AuthorId,
        activation_token: Option<&str>,
        email: &str,
        password_hash: &str,
        avatar_url: &str,
        username: &str,
    ) -> ValidationResult<Self> {
        Ok(Self {
            id: validate_uuid(id)?,
            activation_token: validate_activation_token(activation_token)?,
            email: validate_email(email)?,
            password_hash: validate_password_hash(password_hash)?,
            avatar_url: validate_avatar_url(avatar_url)?,
            username: validate_username(username)?,
        })
    }

    pub fn id(&self) -> AuthorId {
        self.id
    }

    /// `None` once the author has been activated.
    pub fn activation_token(&self) -> Option<&str> {
        self.activation_token.as_deref()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn avatar_url(&self) -> &str {
        &self.avatar_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns whether the activation token has been cleared.
    pub fn is_activated(&self) -> bool {
        self.activation_token.is_none()
    }

    pub fn set_activation_token(&mut self, raw: Option<&str>) -> ValidationResult<()> {
        self.activation_token = validate_activation_token(raw)?;
        Ok(())
    }

    pub fn set_email(&mut self, raw: &str) -> ValidationResult<()> {
        self.email = validate_email(raw)?;
        Ok(())
    }

    pub fn set_password_hash(&mut self, raw: &str) -> ValidationResult<()> {
        self.password_hash = validate_password_hash(raw)?;
        Ok(())
    }

    pub fn set_avatar_url(&mut self, raw: &str) -> ValidationResult<()> {
        self.avatar_url = validate_avatar_url(raw)?;
        Ok(())
    }

    pub fn set_username(&mut self, raw: &str) -> ValidationResult<()> {
        self.username = validate_username(raw)?;
        Ok(())
    }
}
