use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;

/// Minimum accepted length of a plaintext password, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("hash password: {0}")]
    Hash(password_hash::Error),
    #[error("stored hash is malformed: {0}")]
    MalformedHash(password_hash::Error),
}

const DECOY_PASSWORD: &str = "no-account-has-this-password";

lazy_static! {
    /// Verified against when no account matches, so an unknown email costs
    /// the same argon2 work as a wrong password.
    static ref DECOY_HASH: String = hash_password(DECOY_PASSWORD).unwrap();
}

/// Hashes `plain` with a fresh random salt, returning a PHC string.
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError::Hash)
}

/// `Ok(false)` on mismatch; errors only when the stored hash cannot be parsed.
pub fn verify_password(plain: &str, stored: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored).map_err(PasswordError::MalformedHash)?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Hash(e)),
    }
}

/// Checks `plain` against an account's stored hash, or against the decoy hash
/// when there is no account. The decoy path always yields `Ok(false)`.
pub fn verify_credentials(plain: &str, stored: Option<&str>) -> Result<bool, PasswordError> {
    match stored {
        Some(hash) => verify_password(plain, hash),
        None => verify_password(plain, &DECOY_HASH).map(|_| false),
    }
}
