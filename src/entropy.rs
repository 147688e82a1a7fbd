//! Random byte source used for salts and session ids.

use crate::error::{AuthError, Result};
use rand::RngCore;

/// Cryptographically suitable random bytes.
pub trait EntropySource: Send + Sync {
    fn fill(&self, buf: &mut [u8]) -> Result<()>;
}

/// Operating system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        rand::rngs::OsRng
            .try_fill_bytes(buf)
            .map_err(|e| AuthError::Entropy(e.to_string()))
    }
}
