//! Field validators for author records.
//!
//! # Responsibility
//! - Normalize and check each raw author field before it reaches the entity.
//! - Report the originating field and failure class for every rejection.
//!
//! # Invariants
//! - Every validator is pure: same input, same output or error.
//! - Length bounds are measured in UTF-8 bytes, matching column sizes.
//! - Format checks run before length checks.

use argon2::{Algorithm, PasswordHash};
use email_address::{EmailAddress, Options};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Exact length of an activation token in hex characters.
pub const ACTIVATION_TOKEN_LEN: usize = 32;
/// Maximum email length in bytes.
pub const EMAIL_MAX_BYTES: usize = 128;
/// Maximum avatar URL length in bytes.
pub const AVATAR_URL_MAX_BYTES: usize = 255;
/// Maximum username length in bytes.
pub const USERNAME_MAX_BYTES: usize = 32;

static MARKUP_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^<>]*>").expect("valid markup tag regex"));

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Author field a validation error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorField {
    Id,
    ActivationToken,
    Email,
    PasswordHash,
    AvatarUrl,
    Username,
}

impl AuthorField {
    /// Column name of this field in the `author` table.
    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "authorId",
            Self::ActivationToken => "authorActivationToken",
            Self::Email => "authorEmail",
            Self::PasswordHash => "authorHash",
            Self::AvatarUrl => "authorAvatarUrl",
            Self::Username => "authorUsername",
        }
    }
}

impl Display for AuthorField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Id => "id",
            Self::ActivationToken => "activation token",
            Self::Email => "email",
            Self::PasswordHash => "password hash",
            Self::AvatarUrl => "avatar url",
            Self::Username => "username",
        };
        f.write_str(name)
    }
}

/// Rejection produced by a field validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Structurally malformed input (bad grammar, non-hex, unknown algorithm, empty).
    InvalidFormat {
        field: AuthorField,
        reason: &'static str,
    },
    /// Value does not fit the declared storage bound.
    Length {
        field: AuthorField,
        max: usize,
        actual: usize,
    },
}

impl ValidationError {
    /// Field the failing check belongs to.
    pub fn field(&self) -> AuthorField {
        match self {
            Self::InvalidFormat { field, .. } | Self::Length { field, .. } => *field,
        }
    }

    pub fn is_invalid_format(&self) -> bool {
        matches!(self, Self::InvalidFormat { .. })
    }

    pub fn is_length(&self) -> bool {
        matches!(self, Self::Length { .. })
    }

    fn invalid(field: AuthorField, reason: &'static str) -> Self {
        Self::InvalidFormat { field, reason }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat { field, reason } => write!(f, "invalid {field}: {reason}"),
            Self::Length { field, max, actual } if field == &AuthorField::ActivationToken => {
                write!(f, "{field} must be exactly {max} characters, got {actual}")
            }
            Self::Length { field, max, actual } => {
                write!(f, "{field} is too long: {actual} bytes exceeds {max}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Parses a textual UUID into the canonical author id.
///
/// Accepts any form `uuid` understands (hyphenated, simple, braced, urn).
/// The nil UUID is rejected since it cannot serve as an identity key.
pub fn validate_id(raw: &str) -> ValidationResult<Uuid> {
    let id = Uuid::parse_str(raw.trim())
        .map_err(|_| ValidationError::invalid(AuthorField::Id, "not a valid uuid"))?;
    ensure_not_nil(id)
}

/// Parses the 16-byte binary form stored in `author.authorId`.
pub fn validate_id_bytes(raw: &[u8]) -> ValidationResult<Uuid> {
    let id = Uuid::from_slice(raw)
        .map_err(|_| ValidationError::invalid(AuthorField::Id, "uuid bytes must be 16 long"))?;
    ensure_not_nil(id)
}

/// Checks an already-typed id.
pub fn validate_uuid(id: Uuid) -> ValidationResult<Uuid> {
    ensure_not_nil(id)
}

fn ensure_not_nil(id: Uuid) -> ValidationResult<Uuid> {
    if id.is_nil() {
        return Err(ValidationError::invalid(AuthorField::Id, "nil uuid"));
    }
    Ok(id)
}

/// Normalizes an optional activation token.
///
/// `None` means the author is already activated and passes through unchanged.
pub fn validate_activation_token(raw: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let token = raw.trim().to_ascii_lowercase();
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::invalid(
            AuthorField::ActivationToken,
            "must be hexadecimal",
        ));
    }

    if token.len() != ACTIVATION_TOKEN_LEN {
        return Err(ValidationError::Length {
            field: AuthorField::ActivationToken,
            max: ACTIVATION_TOKEN_LEN,
            actual: token.len(),
        });
    }

    Ok(Some(token))
}

/// Checks a bare `local@domain.tld` address.
///
/// Display text (`Name <a@b.com>`), bracketed IP literals and dotless domains
/// are rejected.
pub fn validate_email(raw: &str) -> ValidationResult<String> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(ValidationError::invalid(AuthorField::Email, "empty"));
    }
    let options = Options::default()
        .without_display_text()
        .without_domain_literal()
        .with_required_tld();
    if EmailAddress::parse_with_options(email, options).is_err() {
        return Err(ValidationError::invalid(
            AuthorField::Email,
            "not a valid email address",
        ));
    }

    ensure_max_bytes(AuthorField::Email, email, EMAIL_MAX_BYTES)?;
    Ok(email.to_string())
}

/// Accepts only PHC-formatted hashes tagged `argon2i`.
///
/// Argon2id and Argon2d hashes are rejected as an algorithm mismatch.
pub fn validate_password_hash(raw: &str) -> ValidationResult<String> {
    let hash = raw.trim();
    if hash.is_empty() {
        return Err(ValidationError::invalid(AuthorField::PasswordHash, "empty"));
    }

    let parsed = PasswordHash::new(hash).map_err(|_| {
        ValidationError::invalid(AuthorField::PasswordHash, "not a password hash string")
    })?;
    if parsed.algorithm != Algorithm::Argon2i.ident() {
        return Err(ValidationError::invalid(
            AuthorField::PasswordHash,
            "hash algorithm is not argon2i",
        ));
    }
    if parsed.salt.is_none() || parsed.hash.is_none() {
        return Err(ValidationError::invalid(
            AuthorField::PasswordHash,
            "hash is missing salt or digest",
        ));
    }

    Ok(hash.to_string())
}

/// Sanitizes an avatar URL. An empty value is allowed.
pub fn validate_avatar_url(raw: &str) -> ValidationResult<String> {
    let url = sanitize_text(raw);
    ensure_max_bytes(AuthorField::AvatarUrl, &url, AVATAR_URL_MAX_BYTES)?;
    Ok(url)
}

pub fn validate_username(raw: &str) -> ValidationResult<String> {
    let username = sanitize_text(raw);
    if username.is_empty() {
        return Err(ValidationError::invalid(
            AuthorField::Username,
            "empty after sanitizing",
        ));
    }

    ensure_max_bytes(AuthorField::Username, &username, USERNAME_MAX_BYTES)?;
    Ok(username)
}

/// Strips markup and control characters from free text.
///
/// Complete `<...>` tags are removed first, then any stray angle brackets and
/// control characters. Quotes are kept as-is, never entity-encoded.
pub fn sanitize_text(raw: &str) -> String {
    let without_tags = MARKUP_TAG_RE.replace_all(raw.trim(), "");
    without_tags
        .chars()
        .filter(|c| !c.is_control() && *c != '<' && *c != '>')
        .collect::<String>()
        .trim()
        .to_string()
}

fn ensure_max_bytes(field: AuthorField, value: &str, max: usize) -> ValidationResult<()> {
    if value.len() > max {
        return Err(ValidationError::Length {
            field,
            max,
            actual: value.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{sanitize_text, validate_id_bytes, AuthorField, ValidationError};

    #[test]
    fn sanitize_text_removes_tags_and_controls() {
        assert_eq!(sanitize_text("  <b>bold</b>\u{0}name\t "), "boldname");
        assert_eq!(sanitize_text("a <script"), "a script");
        assert_eq!(sanitize_text("it's \"quoted\""), "it's \"quoted\"");
    }

    #[test]
    fn id_bytes_must_be_sixteen_long() {
        let err = validate_id_bytes(&[1, 2, 3]).unwrap_err();
        assert_eq!(err.field(), AuthorField::Id);
        assert!(err.is_invalid_format());
    }

    #[test]
    fn display_names_the_field() {
        let err = ValidationError::Length {
            field: AuthorField::Username,
            max: 32,
            actual: 40,
        };
        assert_eq!(err.to_string(), "username is too long: 40 bytes exceeds 32");
        assert_eq!(AuthorField::Username.column(), "authorUsername");
    }
}
