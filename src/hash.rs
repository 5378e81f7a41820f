//! Content addressing.
//!
//! One hash shape for everything: SHA-256 over the UTF-8 bytes of the decoded
//! string, rendered as lowercase hex. Whole-file hashes and range hashes are
//! produced by the same function so clients can recompute either from a read
//! response.

use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// SHA-256 hex digest of `content`.
pub fn content_hash(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    let mut out = String::with_capacity(64);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Hash of the empty string.
pub fn empty_hash() -> String {
    content_hash("")
}

/// True when `expected` marks a file that should not exist yet: either the
/// empty string or the hash of empty content.
pub fn is_new_file_sentinel(expected: &str) -> bool {
    expected.is_empty() || expected == empty_hash()
}
