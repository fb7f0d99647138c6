//! Password hashing and session token generation
//!
//! Passwords are stored as `salt$hexdigest` where the digest is
//! SHA-256 over `salt + password`. Session tokens are opaque random
//! strings persisted in the `sessions` table and carried in a cookie.

use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of the random salt prefix in password hashes
const SALT_LEN: usize = 16;

/// Length of generated session tokens
const SESSION_TOKEN_LEN: usize = 32;

/// Hash a password with a fresh random salt
///
/// Output format: `<salt>$<64 hex chars>`
pub fn generate_password_hash(password: &str) -> String {
    let salt: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LEN)
        .map(char::from)
        .collect();
    format!("{}${}", salt, digest(&salt, password))
}

/// Check a password against a stored `salt$digest` hash
///
/// Malformed stored hashes never verify.
pub fn check_password_hash(stored: &str, password: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, expected)) => digest(salt, password) == expected,
        None => false,
    }
}

/// Generate an opaque session token
pub fn generate_session_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_TOKEN_LEN)
        .map(char::from)
        .collect()
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}
