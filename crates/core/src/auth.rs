//! Credential hashing for the auth handshake
//!
//! Plaintext secrets never cross the wire: the client sends a salted
//! SHA-256 digest. The salt is generated fresh for every login attempt and
//! transmitted alongside the digest so the server can verify it.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Salt size in bytes
pub const SALT_SIZE: usize = 16;

/// Hash a secret with an optional salt.
///
/// Deterministic for a fixed (secret, salt) pair: the digest is
/// SHA-256(salt ++ secret).
pub fn hash_password(secret: &str, salt: Option<&[u8]>) -> Vec<u8> {
    let mut hasher = Sha256::new();
    if let Some(salt) = salt {
        hasher.update(salt);
    }
    hasher.update(secret.as_bytes());
    hasher.finalize().to_vec()
}

/// Generate a random per-attempt salt
pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    rand::thread_rng().fill(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic_for_fixed_pair() {
        let salt = [7u8; SALT_SIZE];
        let a = hash_password("hunter2", Some(&salt));
        let b = hash_password("hunter2", Some(&salt));
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn test_salt_changes_digest() {
        let a = hash_password("hunter2", Some(&[1u8; SALT_SIZE]));
        let b = hash_password("hunter2", Some(&[2u8; SALT_SIZE]));
        assert_ne!(a, b);
    }

    #[test]
    fn test_unsalted_differs_from_salted() {
        let salt = generate_salt();
        let unsalted = hash_password("hunter2", None);
        let salted = hash_password("hunter2", Some(&salt));
        assert_ne!(unsalted, salted);
    }

    #[test]
    fn test_generated_salts_unique() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
