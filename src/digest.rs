//! SHA-256 digests of synced artifacts.
//!
//! Sync steps record the digest of every file they copy or write so a report
//! shows exactly which artifact version landed in the web app. A target whose
//! digest already matches the source is left untouched.

use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of a byte slice as 64 lowercase hex chars.
///
/// ```rust
/// use aco_atlas::digest::sha256_hex;
///
/// let digest = sha256_hex(b"Gen.1.1");
/// assert_eq!(digest.len(), 64);
/// ```
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Compute the SHA-256 digest of a file's contents.
pub fn file_digest(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(sha256_hex(&bytes))
}

/// Digest of an existing file, or `None` if it does not exist.
pub fn existing_digest(path: &Path) -> io::Result<Option<String>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(sha256_hex(&bytes))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Check bytes against an expected hex digest.
///
/// Comparison runs over the full length regardless of where the first
/// difference occurs.
pub fn verify_digest(bytes: &[u8], expected: &str) -> bool {
    let computed = sha256_hex(bytes);
    if computed.len() != expected.len() {
        return false;
    }

    computed
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
