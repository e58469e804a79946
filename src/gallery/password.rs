//! Argon2id hashing for gallery passwords.
//!
//! Gallery passwords are shared with guests, but only the PHC string is
//! persisted so a leaked document store does not leak every gallery.

use crate::error::{GalleryError, GalleryResult};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hash a plaintext password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> GalleryResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| GalleryError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC string.
///
/// Returns `Ok(false)` on mismatch; malformed hashes are internal errors.
pub fn verify_password(password: &str, hash: &str) -> GalleryResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| GalleryError::Internal(format!("Stored password hash is invalid: {}", e)))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(GalleryError::Internal(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}
