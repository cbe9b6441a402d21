//! Symmetric encryption helper.
//!
//! This module is intentionally free of configuration and I/O. It wraps the
//! AEAD engine behind a surface with no mode knob and no caller-supplied nonce.
//!
//! # Envelope format (version 1)
//!
//! ```text
//! [0x01][12-byte nonce][ciphertext][16-byte tag]
//! ```
//!
//! The version byte is bound into the AEAD associated data ahead of any
//! caller-supplied associated data.

pub mod cipher;
pub(crate) mod entropy;
pub mod key;

pub use cipher::{decrypt, decrypt_bytes, encrypt, Sealer, DEFAULT_MAX_PLAINTEXT_LEN, NONCE_LEN};
pub use key::SecretKey;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;
