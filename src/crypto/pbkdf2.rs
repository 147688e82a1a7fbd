//! PBKDF2 with HMAC-SHA256 as the PRF (RFC 2898).
//!
//! ## Design
//! - Output is built from ceil(len / 32) blocks, block index big-endian from 1
//! - Each block is the XOR of `iterations` chained HMAC outputs
//! - The final block is truncated to fill exactly the requested length
//! - An iteration count of 0 is treated as 1

use super::hmac::HmacSha256;
use super::sha256::DIGEST_LEN;

/// Fill `out` with key material derived from `password` and `salt`.
///
/// An empty `out` is a no-op.
pub fn pbkdf2_into(password: &[u8], salt: &[u8], iterations: u32, out: &mut [u8]) {
    let iterations = iterations.max(1);

    // The keyed state is reused for every HMAC; only the message changes.
    let keyed = HmacSha256::new(password);

    for (index, chunk) in out.chunks_mut(DIGEST_LEN).enumerate() {
        let block_index = (index as u32).wrapping_add(1);

        let mut mac = keyed.clone();
        mac.update(salt);
        mac.update(&block_index.to_be_bytes());
        let mut u: [u8; DIGEST_LEN] = mac.finalize().into();

        let mut accumulator = u;
        for _ in 1..iterations {
            let mut mac = keyed.clone();
            mac.update(&u);
            u = mac.finalize().into();

            for (acc, &byte) in accumulator.iter_mut().zip(u.iter()) {
                *acc ^= byte;
            }
        }

        chunk.copy_from_slice(&accumulator[..chunk.len()]);
    }
}

/// Derive `len` bytes of key material.
pub fn pbkdf2(password: &[u8], salt: &[u8], iterations: u32, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    pbkdf2_into(password, salt, iterations, &mut out);
    out
}

/// Derive the 32-byte password hash stored in a user record.
pub fn derive_password_hash(password: &[u8], salt: &[u8], iterations: u32) -> [u8; DIGEST_LEN] {
    let mut out = [0u8; DIGEST_LEN];
    pbkdf2_into(password, salt, iterations, &mut out);
    out
}
