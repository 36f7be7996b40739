use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

use crate::users::error::PasswordError;

/// Hash a plaintext secret with Argon2 default parameters and a fresh salt.
/// The result is a PHC string carrying the salt and parameters.
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            PasswordError::Hash(e)
        })?
        .to_string();
    Ok(hash)
}

/// Check `plain` against a stored PHC hash. Comparison is constant time.
pub fn verify_password(hash: &str, plain: &str) -> Result<(), PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        PasswordError::MalformedHash(e)
    })?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(()),
        Err(password_hash::Error::Password) => Err(PasswordError::Mismatch),
        Err(e) => Err(PasswordError::MalformedHash(e)),
    }
}

/// Run a full verify against a fixed hash, so an unknown account costs the
/// same as a wrong password.
pub fn verify_dummy(plain: &str) -> Result<(), PasswordError> {
    lazy_static! {
        static ref DUMMY_HASH: String =
            hash_password("dummy-password-never-matches").unwrap_or_default();
    }
    verify_password(&DUMMY_HASH, plain)
}
