//! Payload fingerprinting
//!
//! SHA-256 over the canonical payload bytes. The role is corruption and
//! tamper detection, not authentication; a standard digest is used because
//! single-byte sensitivity must hold with overwhelming probability.

use sha2::{Digest, Sha256};

/// Compute the lowercase hex SHA-256 digest of `bytes`
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
