//! Secrets never hit the database in plaintext. Passwords are hashed with Argon2 (slow, salted,
//! PHC-format strings). Remember, activation and reset tokens are long random strings, so a
//! SHA-256 digest is enough to store them.
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use digest::Digest;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;

const TOKEN_BYTES: usize = 16;

/// Which of a user's token digests to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestKind {
    Remember,
    Activation,
    Reset,
}

/// Hash a password using Argon2id. Returns a PHC-format string.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("couldn't hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Check a password against a PHC-format hash. A malformed hash never matches.
pub fn verify_password(password: &str, digest: &str) -> bool {
    guard!(let Ok(parsed) = PasswordHash::new(digest) else {
        return false
    });
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// A fresh URL-safe random token, e.g. for a "remember me" cookie or an emailed link.
pub fn new_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    base64::encode_config(&bytes, base64::URL_SAFE_NO_PAD)
}

/// Hex SHA-256 of a token, which is what gets stored.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Does this token hash to the stored digest? An absent digest matches nothing.
pub fn token_matches(stored: Option<&str>, token: &str) -> bool {
    guard!(let Some(stored) = stored else {
        return false
    });
    let candidate = token_digest(token);
    // Compare every byte so the time taken doesn't depend on where the first mismatch is.
    candidate.len() == stored.len()
        && candidate
            .bytes()
            .zip(stored.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
