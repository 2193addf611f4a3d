//! Secret comparison for bearer tokens.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Compare two secrets without leaking their content or length through timing.
///
/// Both sides are hashed to SHA-256 first, then compared with `subtle`.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    Sha256::digest(a).ct_eq(&Sha256::digest(b)).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_only_identical_tokens() {
        assert!(constant_time_eq(b"metrics-token", b"metrics-token"));
        assert!(!constant_time_eq(b"metrics-token", b"metrics-tokem"));
        assert!(!constant_time_eq(b"short", b"a much longer token"));
        assert!(constant_time_eq(b"", b""));
    }
}
