//! Secret hashing and token generation
//!
//! Passwords, e-mail tokens and one-time codes are all stored as Argon2id
//! hashes with a random salt; only the holder of the plaintext can verify.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::{Rng, RngCore};

use crate::error::{FedhaError, FedhaResult};

/// Hash a plaintext secret with Argon2id using a random salt.
pub fn hash_secret(secret: &str) -> FedhaResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| FedhaError::Auth(format!("Failed to hash secret: {}", e)))
}

/// Check a plaintext secret against a stored Argon2 hash string.
pub fn verify_secret(secret: &str, hash: &str) -> FedhaResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| FedhaError::Auth(format!("Invalid stored hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok())
}

/// Random URL-safe secret for confirmation and reset links
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Numeric one-time code of `length` digits (leading zeros allowed)
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
