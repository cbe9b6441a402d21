//! Source of nonce randomness.
//!
//! The seam exists so tests can force a failing or fixed source. It is not
//! exported: callers never get to choose where nonces come from.

use aes_gcm_siv::aead::{rand_core::RngCore, OsRng};
use sealbox_common::SealError;

/// A cryptographically secure byte source.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait EntropySource {
    /// Fill `dest` entirely with random bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SealError::RandomnessUnavailable`] if the source fails. There
    /// is no fallback.
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), SealError>;
}

/// The operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), SealError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|_| SealError::RandomnessUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_entropy_fills_buffer() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        OsEntropy.fill_bytes(&mut a).unwrap();
        OsEntropy.fill_bytes(&mut b).unwrap();
        assert_ne!(a, [0u8; 32]);
        assert_ne!(a, b);
    }
}
