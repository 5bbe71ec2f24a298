//! Password hashing and verification using Argon2id.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use thiserror::Error;

/// Floor applied before hashing at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential processing failed: {0}")]
    Crypto(String),
}

/// Hash a plaintext password into an Argon2id PHC-format string.
///
/// The plaintext is never stored or logged; the salt comes from the OS rng.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CredentialError::Crypto(format!("hash error: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-format hash.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, and an error only
/// when the stored hash itself is malformed. Match and mismatch take the
/// same argon2 work, so timing does not distinguish them.
pub fn verify_password(hash: &str, password: &str) -> Result<bool, CredentialError> {
    let parsed = argon2::PasswordHash::new(hash)
        .map_err(|e| CredentialError::Crypto(format!("invalid hash format: {e}")))?;

    let argon2 = Argon2::default();
    match argon2.verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CredentialError::Crypto(format!("verify error: {e}"))),
    }
}
