//! Password hashing for stored user credentials.
//!
//! # Invariants
//! - Hashes are self-describing: `sha256$<salt>$<hex digest>`.
//! - `verify` never panics on malformed stored values; it returns `false`.

use sha2::{Digest, Sha256};
use uuid::Uuid;

const SCHEME: &str = "sha256";

/// Hashes and verifies user passwords.
pub trait PasswordHasher {
    /// Produces the stored form of `password`.
    fn hash(&self, password: &str) -> String;
    /// Checks `password` against a value produced by `hash`.
    fn verify(&self, password: &str, stored: &str) -> bool;
}

/// Salted SHA-256 hasher.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256PasswordHasher;

impl Sha256PasswordHasher {
    fn digest(salt: &str, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl PasswordHasher for Sha256PasswordHasher {
    fn hash(&self, password: &str) -> String {
        let salt = Uuid::new_v4().simple().to_string();
        let digest = Self::digest(&salt, password);
        format!("{SCHEME}${salt}${digest}")
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        let mut parts = stored.splitn(3, '$');
        let (Some(scheme), Some(salt), Some(digest)) = (parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        scheme == SCHEME && Self::digest(salt, password) == digest
    }
}
