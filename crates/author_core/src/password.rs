//! Argon2i password hashing and activation token generation.
//!
//! # Responsibility
//! - Produce the Argon2i PHC strings accepted by `validate_password_hash`.
//! - Generate fresh activation tokens in the stored hex format.
//!
//! # Invariants
//! - Every hash uses a fresh random salt.
//! - Plaintext passwords are never logged or stored.

use argon2::password_hash::SaltString;
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
};
use rand::Rng;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PasswordResult<T> = Result<T, PasswordError>;

#[derive(Debug)]
pub enum PasswordError {
    EmptyPassword,
    InvalidParams(argon2::Error),
    Hash(argon2::password_hash::Error),
}

impl Display for PasswordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPassword => write!(f, "password cannot be empty"),
            Self::InvalidParams(err) => write!(f, "invalid argon2 parameters: {err}"),
            Self::Hash(err) => write!(f, "argon2i hashing failed: {err}"),
        }
    }
}

impl Error for PasswordError {}

impl From<argon2::password_hash::Error> for PasswordError {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self::Hash(value)
    }
}

/// Argon2i cost settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub time_cost: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            time_cost: 4,
            parallelism: 1,
        }
    }
}

/// Argon2i hasher bound to one set of cost parameters.
pub struct Argon2iHasher {
    argon2: Argon2<'static>,
}

impl Argon2iHasher {
    pub fn new(params: HashParams) -> PasswordResult<Self> {
        let params = Params::new(
            params.memory_kib,
            params.time_cost,
            params.parallelism,
            None,
        )
        .map_err(PasswordError::InvalidParams)?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2i, Version::V0x13, params),
        })
    }

    /// Hashes a plaintext password into a `$argon2i$...` PHC string.
    pub fn hash_password(&self, password: &str) -> PasswordResult<String> {
        if password.is_empty() {
            return Err(PasswordError::EmptyPassword);
        }

        let salt = SaltString::generate(&mut rand::thread_rng());
        let hash = self.argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    /// Checks a plaintext password against a stored hash.
    ///
    /// A mismatching password is `Ok(false)`; a malformed hash is an error.
    pub fn verify_password(&self, password: &str, hash: &str) -> PasswordResult<bool> {
        let parsed = PasswordHash::new(hash)?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

/// Generates a 32-character lowercase hex activation token from 16 random bytes.
pub fn generate_activation_token() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::{generate_activation_token, Argon2iHasher, HashParams, PasswordError};
    use crate::model::validation::validate_activation_token;

    fn cheap_params() -> HashParams {
        HashParams {
            memory_kib: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn hash_is_argon2i_and_verifies() {
        let hasher = Argon2iHasher::new(cheap_params()).unwrap();
        let hash = hasher.hash_password("correct horse").unwrap();

        assert!(hash.starts_with("$argon2i$"));
        assert!(hasher.verify_password("correct horse", &hash).unwrap());
        assert!(!hasher.verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_different_salts() {
        let hasher = Argon2iHasher::new(cheap_params()).unwrap();
        let first = hasher.hash_password("secret").unwrap();
        let second = hasher.hash_password("secret").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn empty_password_is_rejected() {
        let hasher = Argon2iHasher::new(cheap_params()).unwrap();
        assert!(matches!(
            hasher.hash_password(""),
            Err(PasswordError::EmptyPassword)
        ));
    }

    #[test]
    fn zero_time_cost_is_invalid() {
        let params = HashParams {
            time_cost: 0,
            ..cheap_params()
        };
        assert!(matches!(
            Argon2iHasher::new(params),
            Err(PasswordError::InvalidParams(_))
        ));
    }

    #[test]
    fn generated_token_passes_token_validation() {
        let token = generate_activation_token();
        assert_eq!(token.len(), 32);
        assert_eq!(
            validate_activation_token(Some(token.as_str())).unwrap().as_deref(),
            Some(token.as_str())
        );
    }
}
