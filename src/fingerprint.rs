//! Deterministic fingerprinting for registry identity and confirmation tokens.
//!
//! Both registry ids and confirmation tokens are SHA-256 digests rendered
//! as lowercase hex. Registry ids hash only the stable (mail, key) pair;
//! tokens additionally mix in the secret and the request time, so repeated
//! requests for the same pair always produce distinct tokens.

use sha2::{Digest, Sha256};

/// Hex digest of the concatenated parts (64 chars).
pub fn fingerprint(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Stable registry identity for a (mail, key) pair.
pub fn subscription_id(mail: &str, key: &str) -> String {
    fingerprint(&[mail, key])
}
