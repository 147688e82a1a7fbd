//! Hashing primitives used by the credential store.
//!
//! Everything here is pure computation over byte slices: no I/O, no shared
//! state, safe to call from any thread.

pub mod hmac;
pub mod pbkdf2;
pub mod sha256;

pub use self::hmac::{hmac_sha256, HmacSha256};
pub use self::pbkdf2::{derive_password_hash, pbkdf2, pbkdf2_into};
pub use self::sha256::{hash, hash_hex, hash_str, Digest, Sha256, DIGEST_LEN};

/// Constant-time comparison for secrets (password hashes, session ids).
///
/// Length mismatch returns early; the lengths of these values are not secret.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
