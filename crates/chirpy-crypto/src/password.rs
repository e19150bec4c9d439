use argon2::password_hash::{PasswordHash as PhcString, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chirpy_types::PasswordHash;
use rand::rngs::OsRng;

/// Hash a password with Argon2id and a fresh random salt.
///
/// The result is the PHC string (algorithm, parameters, salt and digest)
/// stored as opaque bytes, so two calls with the same password never
/// produce the same output.
pub fn hash_password(password: impl AsRef<str>) -> Result<PasswordHash, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);

    let phc = Argon2::default()
        .hash_password(password.as_ref().as_bytes(), &salt)
        .map_err(|e| CredentialError::Hashing(e.to_string()))?;

    Ok(PasswordHash::from_bytes(phc.to_string().into_bytes()))
}

/// Verify a password against a stored hash.
///
/// Never fails: a mismatch, or a hash that cannot be parsed, yields `false`.
pub fn verify_password(password: impl AsRef<str>, hash: &PasswordHash) -> bool {
    let Ok(encoded) = std::str::from_utf8(hash.as_bytes()) else {
        return false;
    };
    let Ok(parsed) = PhcString::new(encoded) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_ref().as_bytes(), &parsed)
        .is_ok()
}

/// [`verify_password`] as a `Result`, for callers that propagate with `?`.
pub fn check_password(password: impl AsRef<str>, hash: &PasswordHash) -> Result<(), CredentialError> {
    if verify_password(password, hash) {
        Ok(())
    } else {
        Err(CredentialError::InvalidCredential)
    }
}

/// Errors from credential operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("invalid credentials")]
    InvalidCredential,
}
