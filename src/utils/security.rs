//! Security Utilities
//!
//! Password hashing and token digest helpers.

use bcrypt::{hash, verify, DEFAULT_COST};

/// Default bcrypt cost for password hashing
pub const DEFAULT_BCRYPT_COST: u32 = DEFAULT_COST;

/// Hash a password using bcrypt with the default cost
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash_password_with_cost(password, DEFAULT_BCRYPT_COST)
}

/// Hash a password with a custom bcrypt cost
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password, cost)
}

/// Verify a password against its bcrypt hash.
///
/// A malformed stored hash counts as a mismatch rather than an error, so
/// user-supplied input can never surface a hashing failure to the caller.
pub fn verify_password(password: &str, hash: &str) -> bool {
    verify(password, hash).unwrap_or(false)
}

/// SHA-256 digest of a token, hex-encoded. Used where a token must be
/// referenced in logs or storage without retaining the raw credential.
pub fn token_digest(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Cost 4 keeps the hashing tests fast; production uses DEFAULT_BCRYPT_COST.
    const TEST_COST: u32 = 4;

    #[test]
    fn test_bcrypt_cost_bounds() {
        #[allow(clippy::assertions_on_constants)]
        {
            assert!(DEFAULT_BCRYPT_COST >= 4, "bcrypt cost too low for security");
            assert!(
                DEFAULT_BCRYPT_COST <= 31,
                "bcrypt cost too high for performance"
            );
        }
    }

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password_with_cost("Sup3rSecret", TEST_COST).unwrap();

        assert!(verify_password("Sup3rSecret", &hash));
        assert!(!verify_password("wrong_password", &hash));
    }

    #[test]
    fn test_same_password_different_hashes() {
        let hash1 = hash_password_with_cost("Sup3rSecret", TEST_COST).unwrap();
        let hash2 = hash_password_with_cost("Sup3rSecret", TEST_COST).unwrap();

        // Per-hash salts
        assert_ne!(hash1, hash2);
        assert!(verify_password("Sup3rSecret", &hash1));
        assert!(verify_password("Sup3rSecret", &hash2));
    }

    #[test]
    fn test_malformed_hash_is_mismatch() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn test_token_digest_deterministic() {
        let d1 = token_digest("some-token");
        let d2 = token_digest("some-token");

        assert_eq!(d1, d2);
        assert_eq!(d1.len(), 64);
        assert_ne!(d1, token_digest("other-token"));
    }
}
