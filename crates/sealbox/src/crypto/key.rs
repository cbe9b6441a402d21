//! [`SecretKey`]: an owned, self-wiping holder for caller key material.

use std::fmt;

use sealbox_common::SealError;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::entropy::{EntropySource, OsEntropy};
use super::KEY_LEN;

/// Fixed-size key buffer that holds exactly [`KEY_LEN`] bytes.
///
/// The helper never needs one (every operation takes a borrowed `&[u8]`), but
/// callers that want their key wiped on drop and hidden from `Debug` output can
/// keep it here. The bytes are exposed through [`AsRef`].
#[derive(Clone)]
pub struct SecretKey(Box<[u8; KEY_LEN]>);

impl SecretKey {
    /// Copy key material into a new holder.
    ///
    /// # Errors
    ///
    /// Returns [`SealError::KeyLength`] if `bytes` is not [`KEY_LEN`] bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SealError> {
        if bytes.len() != KEY_LEN {
            return Err(SealError::KeyLength {
                expected: KEY_LEN,
                actual: bytes.len(),
            });
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Generate a fresh random key from the OS CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns [`SealError::RandomnessUnavailable`] if the OS source fails.
    pub fn generate() -> Result<Self, SealError> {
        Self::generate_with(&OsEntropy)
    }

    pub(crate) fn generate_with<E: EntropySource + ?Sized>(entropy: &E) -> Result<Self, SealError> {
        let mut buf = Box::new([0u8; KEY_LEN]);
        if let Err(e) = entropy.fill_bytes(buf.as_mut_slice()) {
            buf.as_mut_slice().zeroize();
            return Err(e);
        }
        Ok(Self(buf))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }
}

impl Zeroize for SecretKey {
    fn zeroize(&mut self) {
        self.0.as_mut_slice().zeroize();
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for SecretKey {}

impl AsRef<[u8]> for SecretKey {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("SecretKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::entropy::MockEntropySource;

    #[test]
    fn from_slice_copies() {
        let key = SecretKey::from_slice(&[0x42u8; KEY_LEN]).unwrap();
        assert_eq!(key.as_bytes(), &[0x42u8; KEY_LEN]);
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        for len in [0, 16, 31, 33, 64] {
            let err = SecretKey::from_slice(&vec![0u8; len]).unwrap_err();
            assert!(
                matches!(err, SealError::KeyLength { expected: KEY_LEN, actual } if actual == len),
                "len {len}: {err:?}"
            );
        }
    }

    #[test]
    fn generate_is_random() {
        let a = SecretKey::generate().unwrap();
        let b = SecretKey::generate().unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn generate_propagates_entropy_failure() {
        let mut entropy = MockEntropySource::new();
        entropy
            .expect_fill_bytes()
            .times(1)
            .returning(|_| Err(SealError::RandomnessUnavailable));
        let err = SecretKey::generate_with(&entropy).unwrap_err();
        assert!(matches!(err, SealError::RandomnessUnavailable));
    }

    #[test]
    fn redacted_in_debug() {
        let key = SecretKey::from_slice(&[0xFFu8; KEY_LEN]).unwrap();
        let dbg = format!("{key:?}");
        assert!(dbg.contains("REDACTED"));
        assert!(!dbg.contains("255"));
    }

    #[test]
    fn zeroize_wipes() {
        let mut key = SecretKey::from_slice(&[0x11u8; KEY_LEN]).unwrap();
        key.zeroize();
        assert!(key.as_bytes().iter().all(|&b| b == 0));
    }
}
