//! `sealbox` — a small, misuse-resistant symmetric encryption helper.
//!
//! Callers supply a 32-byte key and plaintext; the helper picks the
//! construction, draws a fresh nonce from the OS CSPRNG, and returns a
//! self-describing [`Envelope`]:
//!
//! ```text
//! [1 byte version][12 bytes nonce][ciphertext][16 bytes tag]
//! ```
//!
//! There is no mode parameter. Block-wise deterministic modes such as ECB are
//! not reachable through this crate; [`audit::detect_repeated_blocks`] exists
//! to spot them in other people's ciphertext.
//!
//! ```no_run
//! # fn main() -> Result<(), sealbox::SealError> {
//! let key = sealbox::SecretKey::generate()?;
//! let envelope = sealbox::encrypt(key.as_bytes(), b"attack at dawn", Some(b"msg-42"))?;
//! let plaintext = sealbox::decrypt(key.as_bytes(), &envelope, Some(b"msg-42"))?;
//! assert_eq!(plaintext.as_slice(), b"attack at dawn");
//! # Ok(())
//! # }
//! ```
//!
//! Every operation is synchronous and stateless; a [`Sealer`] may be shared
//! across threads without coordination.

pub mod audit;
pub mod config;
pub mod crypto;
pub mod telemetry;

pub use crypto::{decrypt, decrypt_bytes, encrypt, Sealer, SecretKey, KEY_LEN};
pub use sealbox_common::{Envelope, EnvelopeDefect, Format, SealError};
pub use zeroize::Zeroizing;
