//! SHA-256 hex digest helpers.
//!
//! Shared by the content hasher and note GUID generation.

use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// SHA-256 hex digest truncated to the first `len` hex characters.
///
/// `len` is capped at 64 (the full digest).
pub fn sha256_hex_prefix(data: &[u8], len: usize) -> String {
    let mut hex = sha256_hex(data);
    hex.truncate(len.min(64));
    hex
}
