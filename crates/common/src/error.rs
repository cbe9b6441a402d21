//! Error taxonomy shared across crates.

use thiserror::Error;

/// Top-level error returned by every sealing and opening operation.
///
/// Variants are coarse on purpose where the caller could otherwise learn *why*
/// an opened envelope was rejected:
/// - [`SealError::KeyLength`] → programmer error, surfaced before any cipher call
/// - [`SealError::Format`] → the envelope is structurally unusable
/// - [`SealError::AuthenticationFailure`] → every cryptographic rejection
/// - [`SealError::RandomnessUnavailable`] → the OS CSPRNG failed; never retried
#[derive(Debug, Error)]
pub enum SealError {
    /// The caller-supplied key does not have the length the construction requires.
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    KeyLength { expected: usize, actual: usize },

    /// The envelope is malformed or uses an unsupported format version.
    #[error("malformed envelope: {0}")]
    Format(#[from] EnvelopeDefect),

    /// The envelope did not authenticate under the given key and associated data.
    #[error("envelope could not be opened")]
    AuthenticationFailure,

    /// The secure random source failed; the encryption call was aborted.
    #[error("secure randomness unavailable")]
    RandomnessUnavailable,

    /// The plaintext exceeds the configured sealing limit.
    #[error("plaintext too large: {len} bytes exceeds limit of {max}")]
    PlaintextTooLarge { len: usize, max: usize },
}

impl SealError {
    /// Short machine-readable code, safe to put in logs and metrics labels.
    pub fn code(&self) -> &'static str {
        match self {
            SealError::KeyLength { .. } => "key_length",
            SealError::Format(_) => "format",
            SealError::AuthenticationFailure => "authentication_failure",
            SealError::RandomnessUnavailable => "randomness_unavailable",
            SealError::PlaintextTooLarge { .. } => "plaintext_too_large",
        }
    }
}

/// Structural reasons an envelope is rejected before any cipher work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeDefect {
    /// Zero-length input.
    #[error("empty envelope")]
    Empty,

    /// The leading version byte names no known format.
    #[error("unsupported version {0:#04x}")]
    UnsupportedVersion(u8),

    /// Shorter than version + nonce + tag.
    #[error("truncated: {len} bytes, need at least {min}")]
    Truncated { len: usize, min: usize },

    /// A fixed-size field has the wrong length for its format.
    #[error("{field} must be {expected} bytes, got {actual}")]
    FieldLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The text armor could not be decoded.
    #[error("invalid armor: {0}")]
    Armor(&'static str),
}
