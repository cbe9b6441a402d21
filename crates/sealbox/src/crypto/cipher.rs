//! AES-256-GCM-SIV sealing and opening of arbitrary byte strings.
//!
//! **Algorithm choice:** AES-256-GCM-SIV (RFC 8452) is authenticated and
//! nonce-misuse-resistant. A fresh random 96-bit nonce is still drawn from the
//! OS CSPRNG for every call, so sealing the same plaintext twice under the same
//! key yields unrelated envelopes.
//!
//! There is no mode parameter anywhere in this module. `encrypt` always emits
//! [`Format::CURRENT`]; `decrypt` only opens versions it has a construction for.

use aes_gcm_siv::{
    aead::{AeadInPlace, KeyInit},
    Aes256GcmSiv, Nonce, Tag,
};
use sealbox_common::{Envelope, EnvelopeDefect, Format, SealError};
use tracing::{debug, trace, warn};
use zeroize::{Zeroize, Zeroizing};

use super::entropy::{EntropySource, OsEntropy};
use super::KEY_LEN;

/// Byte length of the nonce embedded in every current-format envelope.
pub const NONCE_LEN: usize = Format::CURRENT.nonce_len;

/// Largest plaintext a default [`Sealer`] accepts (64 MiB).
pub const DEFAULT_MAX_PLAINTEXT_LEN: usize = 64 * 1024 * 1024;

/// Seals and opens envelopes under a plaintext size limit.
///
/// A `Sealer` holds no key and no mutable state; it is `Copy` and can be shared
/// freely between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sealer {
    max_plaintext_len: usize,
}

impl Default for Sealer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PLAINTEXT_LEN)
    }
}

impl Sealer {
    pub fn new(max_plaintext_len: usize) -> Self {
        Self { max_plaintext_len }
    }

    pub fn max_plaintext_len(&self) -> usize {
        self.max_plaintext_len
    }

    /// Encrypt `plaintext` under `key` into a fresh envelope.
    ///
    /// `associated_data` is authenticated but not encrypted; `None` and an empty
    /// slice are equivalent. The same value must be supplied to open it.
    ///
    /// # Errors
    ///
    /// - [`SealError::KeyLength`] if `key` is not [`KEY_LEN`] bytes.
    /// - [`SealError::PlaintextTooLarge`] if `plaintext` exceeds the limit.
    /// - [`SealError::RandomnessUnavailable`] if no nonce could be generated.
    pub fn encrypt(
        &self,
        key: &[u8],
        plaintext: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<Envelope, SealError> {
        self.encrypt_with(&OsEntropy, key, plaintext, associated_data)
    }

    pub(crate) fn encrypt_with<E: EntropySource + ?Sized>(
        &self,
        entropy: &E,
        key: &[u8],
        plaintext: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<Envelope, SealError> {
        let format = &Format::CURRENT;
        let cipher = build_cipher(key)?;
        self.check_len(plaintext.len())?;

        let mut nonce = [0u8; NONCE_LEN];
        if let Err(e) = entropy.fill_bytes(&mut nonce) {
            warn!(error = %e, "nonce generation failed; aborting encryption");
            return Err(e);
        }

        let aad = bind_header(&[format.version], associated_data);

        // Encrypt in place inside the output buffer so no separate plaintext
        // copy outlives the call.
        let mut buf = Vec::with_capacity(format.overhead() + plaintext.len());
        buf.push(format.version);
        buf.extend_from_slice(&nonce);
        buf.extend_from_slice(plaintext);

        let tag = match cipher.encrypt_in_place_detached(
            Nonce::from_slice(&nonce),
            &aad,
            &mut buf[format.header_len()..],
        ) {
            Ok(tag) => tag,
            Err(_) => {
                buf.zeroize();
                return Err(SealError::PlaintextTooLarge {
                    len: plaintext.len(),
                    max: self.max_plaintext_len,
                });
            }
        };
        buf.extend_from_slice(&tag);

        let envelope = Envelope::from_vec(buf)?;
        trace!(
            version = format.version,
            envelope_len = envelope.as_bytes().len(),
            "envelope sealed"
        );
        Ok(envelope)
    }

    /// Authenticate and decrypt `envelope`.
    ///
    /// Plaintext is only returned after the tag verifies; the staging buffer is
    /// wiped on every failure path and the returned buffer wipes itself on drop.
    ///
    /// # Errors
    ///
    /// - [`SealError::KeyLength`] if `key` is not [`KEY_LEN`] bytes.
    /// - [`SealError::Format`] if no construction is available for the version.
    /// - [`SealError::PlaintextTooLarge`] if the ciphertext exceeds the limit.
    /// - [`SealError::AuthenticationFailure`] for any tampering, wrong key, or
    ///   mismatched associated data.
    pub fn decrypt(
        &self,
        key: &[u8],
        envelope: &Envelope,
        associated_data: Option<&[u8]>,
    ) -> Result<Zeroizing<Vec<u8>>, SealError> {
        let cipher = build_cipher(key)?;
        if *envelope.format() != Format::V1 {
            return Err(EnvelopeDefect::UnsupportedVersion(envelope.version()).into());
        }
        self.check_len(envelope.ciphertext().len())?;

        let aad = bind_header(envelope.header(), associated_data);
        let mut buf = Zeroizing::new(envelope.ciphertext().to_vec());
        cipher
            .decrypt_in_place_detached(
                Nonce::from_slice(envelope.nonce()),
                &aad,
                buf.as_mut_slice(),
                Tag::from_slice(envelope.tag()),
            )
            .map_err(|_| {
                debug!(version = envelope.version(), "envelope failed authentication");
                SealError::AuthenticationFailure
            })?;

        trace!(version = envelope.version(), "envelope opened");
        Ok(buf)
    }

    /// Parse raw envelope bytes, then [`Sealer::decrypt`] them.
    ///
    /// The key length is checked first, then the envelope structure; no cipher
    /// work happens unless both are valid.
    pub fn decrypt_bytes(
        &self,
        key: &[u8],
        envelope: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<Zeroizing<Vec<u8>>, SealError> {
        check_key_len(key)?;
        let envelope = Envelope::parse(envelope)?;
        self.decrypt(key, &envelope, associated_data)
    }

    fn check_len(&self, len: usize) -> Result<(), SealError> {
        if len > self.max_plaintext_len {
            return Err(SealError::PlaintextTooLarge {
                len,
                max: self.max_plaintext_len,
            });
        }
        Ok(())
    }
}

/// Encrypt with a default [`Sealer`]. See [`Sealer::encrypt`].
pub fn encrypt(
    key: &[u8],
    plaintext: &[u8],
    associated_data: Option<&[u8]>,
) -> Result<Envelope, SealError> {
    Sealer::default().encrypt(key, plaintext, associated_data)
}

/// Decrypt with a default [`Sealer`]. See [`Sealer::decrypt`].
pub fn decrypt(
    key: &[u8],
    envelope: &Envelope,
    associated_data: Option<&[u8]>,
) -> Result<Zeroizing<Vec<u8>>, SealError> {
    Sealer::default().decrypt(key, envelope, associated_data)
}

/// Parse and decrypt with a default [`Sealer`]. See [`Sealer::decrypt_bytes`].
pub fn decrypt_bytes(
    key: &[u8],
    envelope: &[u8],
    associated_data: Option<&[u8]>,
) -> Result<Zeroizing<Vec<u8>>, SealError> {
    Sealer::default().decrypt_bytes(key, envelope, associated_data)
}

fn check_key_len(key: &[u8]) -> Result<(), SealError> {
    if key.len() != KEY_LEN {
        return Err(SealError::KeyLength {
            expected: KEY_LEN,
            actual: key.len(),
        });
    }
    Ok(())
}

fn build_cipher(key: &[u8]) -> Result<Aes256GcmSiv, SealError> {
    check_key_len(key)?;
    Aes256GcmSiv::new_from_slice(key).map_err(|_| SealError::KeyLength {
        expected: KEY_LEN,
        actual: key.len(),
    })
}

/// AEAD associated data: the envelope header followed by the caller's data.
fn bind_header(header: &[u8], associated_data: Option<&[u8]>) -> Vec<u8> {
    [header, associated_data.unwrap_or_default()].concat()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::entropy::MockEntropySource;

    const KEY: [u8; KEY_LEN] = [0x42; KEY_LEN];

    fn fixed_nonce(byte: u8) -> MockEntropySource {
        let mut entropy = MockEntropySource::new();
        entropy.expect_fill_bytes().returning(move |dest| {
            dest.fill(byte);
            Ok(())
        });
        entropy
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let plaintext = b"123-45-6789";
        let envelope = encrypt(&KEY, plaintext, None).unwrap();
        let decrypted = decrypt(&KEY, &envelope, None).unwrap();
        assert_eq!(decrypted.as_slice(), plaintext);
    }

    #[test]
    fn empty_plaintext_round_trip() {
        let envelope = encrypt(&KEY, b"", None).unwrap();
        assert!(envelope.ciphertext().is_empty());
        assert_eq!(envelope.as_bytes().len(), Format::CURRENT.overhead());
        assert!(decrypt(&KEY, &envelope, None).unwrap().is_empty());
    }

    #[test]
    fn layout_matches_current_format() {
        let envelope = encrypt(&KEY, b"hello world", None).unwrap();
        assert_eq!(envelope.version(), Format::CURRENT.version);
        assert_eq!(envelope.nonce().len(), NONCE_LEN);
        assert_eq!(envelope.tag().len(), Format::CURRENT.tag_len);
        assert_eq!(envelope.ciphertext().len(), b"hello world".len());
    }

    #[test]
    fn associated_data_must_match() {
        let envelope = encrypt(&KEY, b"payload", Some(b"tenant-a")).unwrap();
        assert_eq!(
            decrypt(&KEY, &envelope, Some(b"tenant-a")).unwrap().as_slice(),
            b"payload"
        );
        assert!(matches!(
            decrypt(&KEY, &envelope, Some(b"tenant-b")),
            Err(SealError::AuthenticationFailure)
        ));
        assert!(matches!(
            decrypt(&KEY, &envelope, None),
            Err(SealError::AuthenticationFailure)
        ));
    }

    #[test]
    fn none_and_empty_associated_data_are_equivalent() {
        let envelope = encrypt(&KEY, b"payload", None).unwrap();
        assert!(decrypt(&KEY, &envelope, Some(&[])).is_ok());
    }

    #[test]
    fn wrong_key_fails_decryption() {
        let envelope = encrypt(&KEY, b"secret", None).unwrap();
        let other = [0x43u8; KEY_LEN];
        assert!(matches!(
            decrypt(&other, &envelope, None),
            Err(SealError::AuthenticationFailure)
        ));
    }

    #[test]
    fn invalid_key_length_rejected_before_nonce_generation() {
        let mut entropy = MockEntropySource::new();
        entropy.expect_fill_bytes().times(0);
        for len in [0, 16, 24, 31, 33] {
            let key = vec![0u8; len];
            let err = Sealer::default()
                .encrypt_with(&entropy, &key, b"x", None)
                .unwrap_err();
            assert!(matches!(err, SealError::KeyLength { expected: 32, actual } if actual == len));
        }
    }

    #[test]
    fn invalid_key_length_rejected_on_decrypt() {
        let envelope = encrypt(&KEY, b"x", None).unwrap();
        let err = decrypt(&KEY[..16], &envelope, None).unwrap_err();
        assert!(matches!(err, SealError::KeyLength { .. }));
        // Checked before the envelope is even parsed.
        let err = decrypt_bytes(&KEY[..16], &[0xFF], None).unwrap_err();
        assert!(matches!(err, SealError::KeyLength { .. }));
    }

    #[test]
    fn randomness_failure_aborts_encryption() {
        let mut entropy = MockEntropySource::new();
        entropy
            .expect_fill_bytes()
            .times(1)
            .returning(|_| Err(SealError::RandomnessUnavailable));
        let err = Sealer::default()
            .encrypt_with(&entropy, &KEY, b"x", None)
            .unwrap_err();
        assert!(matches!(err, SealError::RandomnessUnavailable));
    }

    #[test]
    fn nonce_comes_from_entropy_source() {
        let entropy = fixed_nonce(0xA5);
        let envelope = Sealer::default()
            .encrypt_with(&entropy, &KEY, b"x", None)
            .unwrap();
        assert_eq!(envelope.nonce(), &[0xA5; NONCE_LEN]);
        assert_eq!(decrypt(&KEY, &envelope, None).unwrap().as_slice(), b"x");
    }

    #[test]
    fn every_bit_flip_after_version_fails_auth() {
        let envelope = encrypt(&KEY, b"tamper me, any bit", Some(b"ad")).unwrap();
        let bytes = envelope.into_bytes();
        for byte in 1..bytes.len() {
            for bit in 0..8 {
                let mut tampered = bytes.clone();
                tampered[byte] ^= 1 << bit;
                let result = decrypt_bytes(&KEY, &tampered, Some(b"ad"));
                assert!(
                    matches!(result, Err(SealError::AuthenticationFailure)),
                    "byte {byte} bit {bit}"
                );
            }
        }
    }

    #[test]
    fn version_bit_flip_fails_closed_as_format() {
        let bytes = encrypt(&KEY, b"x", None).unwrap().into_bytes();
        for bit in 0..8 {
            let mut tampered = bytes.clone();
            tampered[0] ^= 1 << bit;
            assert!(matches!(
                decrypt_bytes(&KEY, &tampered, None),
                Err(SealError::Format(EnvelopeDefect::UnsupportedVersion(_)))
            ));
        }
    }

    #[test]
    fn truncation_is_rejected() {
        let bytes = encrypt(&KEY, b"truncate me", None).unwrap().into_bytes();
        assert!(matches!(
            decrypt_bytes(&KEY, &bytes[..bytes.len() - 1], None),
            Err(SealError::AuthenticationFailure)
        ));
        assert!(matches!(
            decrypt_bytes(&KEY, &bytes[..Format::CURRENT.overhead() - 1], None),
            Err(SealError::Format(EnvelopeDefect::Truncated { .. }))
        ));
    }

    #[test]
    fn reordered_ciphertext_fails_auth() {
        let envelope = encrypt(&KEY, b"abcdefghijklmnopqrstuvwxyz0123456789", None).unwrap();
        let mut bytes = envelope.into_bytes();
        let start = Format::CURRENT.header_len();
        bytes[start..start + 32].rotate_left(16);
        assert!(matches!(
            decrypt_bytes(&KEY, &bytes, None),
            Err(SealError::AuthenticationFailure)
        ));
    }

    #[test]
    fn plaintext_limit_enforced() {
        let sealer = Sealer::new(8);
        assert!(sealer.encrypt(&KEY, &[0u8; 8], None).is_ok());
        let err = sealer.encrypt(&KEY, &[0u8; 9], None).unwrap_err();
        assert!(matches!(err, SealError::PlaintextTooLarge { len: 9, max: 8 }));

        let big = encrypt(&KEY, &[0u8; 9], None).unwrap();
        assert!(matches!(
            sealer.decrypt(&KEY, &big, None),
            Err(SealError::PlaintextTooLarge { .. })
        ));
    }

    #[test]
    fn cipher_round_keys_wipe_on_drop() {
        fn assert_wipes_on_drop<T: zeroize::ZeroizeOnDrop>() {}
        assert_wipes_on_drop::<aes::Aes256>();
    }

    #[test]
    fn same_input_twice_differs() {
        let a = encrypt(&KEY, b"same", None).unwrap();
        let b = encrypt(&KEY, b"same", None).unwrap();
        assert_ne!(a.nonce(), b.nonce());
        assert_ne!(a.as_bytes(), b.as_bytes());
    }
}
