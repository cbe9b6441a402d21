//! The envelope: the only unit that crosses the helper's boundary.
//!
//! # Wire format
//!
//! ```text
//! [1 byte version][N bytes nonce][ciphertext][T bytes tag]
//! ```
//!
//! `N` and `T` are declared once per version by [`Format`]. A version number is
//! never reused for an incompatible layout.
//!
//! # Text armor
//!
//! ```text
//! v<version>.<base64url-no-pad(nonce)>.<base64url-no-pad(ciphertext+tag)>
//! ```

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EnvelopeDefect, SealError};

/// Layout parameters for one envelope version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    /// Leading version byte.
    pub version: u8,
    /// Human-readable construction name.
    pub name: &'static str,
    /// Nonce length in bytes.
    pub nonce_len: usize,
    /// Authentication tag length in bytes.
    pub tag_len: usize,
}

impl Format {
    /// AES-256-GCM-SIV (RFC 8452), 96-bit nonce, 128-bit tag.
    pub const V1: Format = Format {
        version: 0x01,
        name: "AES-256-GCM-SIV",
        nonce_len: 12,
        tag_len: 16,
    };

    /// The format every new envelope is sealed with.
    pub const CURRENT: Format = Format::V1;

    const SUPPORTED: &'static [Format] = &[Format::V1];

    /// Find the format registered for `version`.
    pub fn lookup(version: u8) -> Option<&'static Format> {
        Self::SUPPORTED.iter().find(|f| f.version == version)
    }

    /// Length of the version byte plus nonce.
    pub const fn header_len(&self) -> usize {
        1 + self.nonce_len
    }

    /// Total bytes an envelope adds on top of the ciphertext.
    pub const fn overhead(&self) -> usize {
        1 + self.nonce_len + self.tag_len
    }
}

/// A structurally valid envelope.
///
/// Holding an `Envelope` guarantees the version is supported and the buffer is
/// long enough for the version byte, nonce and tag. It says nothing about
/// authenticity; that is only established by opening it.
#[derive(Clone, PartialEq, Eq)]
pub struct Envelope {
    format: &'static Format,
    bytes: Vec<u8>,
}

impl Envelope {
    /// Take ownership of raw envelope bytes after validating their structure.
    ///
    /// # Errors
    ///
    /// Returns [`SealError::Format`] if the buffer is empty, names an unknown
    /// version, or is too short for its format.
    pub fn from_vec(bytes: Vec<u8>) -> Result<Self, SealError> {
        let version = *bytes.first().ok_or(EnvelopeDefect::Empty)?;
        let format =
            Format::lookup(version).ok_or(EnvelopeDefect::UnsupportedVersion(version))?;
        if bytes.len() < format.overhead() {
            return Err(EnvelopeDefect::Truncated {
                len: bytes.len(),
                min: format.overhead(),
            }
            .into());
        }
        Ok(Self { format, bytes })
    }

    /// Validate and copy a borrowed envelope.
    pub fn parse(bytes: &[u8]) -> Result<Self, SealError> {
        Self::from_vec(bytes.to_vec())
    }

    /// Assemble an envelope from its fields.
    ///
    /// # Errors
    ///
    /// Returns [`SealError::Format`] if `format` is not a registered format or if
    /// `nonce` / `tag` do not match the lengths it declares.
    pub fn from_parts(
        format: &Format,
        nonce: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
    ) -> Result<Self, SealError> {
        let registered = Format::lookup(format.version)
            .filter(|f| *f == format)
            .ok_or(EnvelopeDefect::UnsupportedVersion(format.version))?;
        check_field("nonce", registered.nonce_len, nonce.len())?;
        check_field("tag", registered.tag_len, tag.len())?;

        let mut bytes = Vec::with_capacity(registered.overhead() + ciphertext.len());
        bytes.push(registered.version);
        bytes.extend_from_slice(nonce);
        bytes.extend_from_slice(ciphertext);
        bytes.extend_from_slice(tag);
        Ok(Self {
            format: registered,
            bytes,
        })
    }

    /// The version byte.
    pub fn version(&self) -> u8 {
        self.format.version
    }

    /// Layout parameters of this envelope's version.
    pub fn format(&self) -> &'static Format {
        self.format
    }

    /// The version byte as a slice; bound into the authenticated data.
    pub fn header(&self) -> &[u8] {
        &self.bytes[..1]
    }

    pub fn nonce(&self) -> &[u8] {
        &self.bytes[1..self.format.header_len()]
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.bytes[self.format.header_len()..self.tag_start()]
    }

    pub fn tag(&self) -> &[u8] {
        &self.bytes[self.tag_start()..]
    }

    /// Ciphertext followed by tag.
    pub fn sealed(&self) -> &[u8] {
        &self.bytes[self.format.header_len()..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Encode as the `v<version>.<nonce>.<sealed>` text form.
    pub fn to_armored(&self) -> String {
        format!(
            "v{}.{}.{}",
            self.version(),
            URL_SAFE_NO_PAD.encode(self.nonce()),
            URL_SAFE_NO_PAD.encode(self.sealed()),
        )
    }

    /// Parse the text form produced by [`Envelope::to_armored`].
    ///
    /// # Errors
    ///
    /// Returns [`SealError::Format`] on any structural or encoding defect.
    pub fn from_armored(s: &str) -> Result<Self, SealError> {
        let mut parts = s.splitn(3, '.');
        let (Some(tag), Some(nonce), Some(sealed)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(EnvelopeDefect::Armor("expected three dot-separated parts").into());
        };

        let version: u8 = tag
            .strip_prefix('v')
            .and_then(|v| v.parse().ok())
            .ok_or(EnvelopeDefect::Armor("bad version prefix"))?;
        // One spelling per version: `v01` and `v+1` are not `v1`.
        if tag != format!("v{version}") {
            return Err(EnvelopeDefect::Armor("non-canonical version prefix").into());
        }
        let format =
            Format::lookup(version).ok_or(EnvelopeDefect::UnsupportedVersion(version))?;

        let nonce = URL_SAFE_NO_PAD
            .decode(nonce)
            .map_err(|_| EnvelopeDefect::Armor("nonce is not base64url"))?;
        check_field("nonce", format.nonce_len, nonce.len())?;
        let sealed = URL_SAFE_NO_PAD
            .decode(sealed)
            .map_err(|_| EnvelopeDefect::Armor("ciphertext is not base64url"))?;

        let mut bytes = Vec::with_capacity(format.header_len() + sealed.len());
        bytes.push(version);
        bytes.extend_from_slice(&nonce);
        bytes.extend_from_slice(&sealed);
        Self::from_vec(bytes)
    }

    fn tag_start(&self) -> usize {
        self.bytes.len() - self.format.tag_len
    }
}

fn check_field(field: &'static str, expected: usize, actual: usize) -> Result<(), EnvelopeDefect> {
    if expected != actual {
        return Err(EnvelopeDefect::FieldLength {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("format", &self.format.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl AsRef<[u8]> for Envelope {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl TryFrom<Vec<u8>> for Envelope {
    type Error = SealError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_vec(bytes)
    }
}

impl FromStr for Envelope {
    type Err = SealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_armored(s)
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_armored())
    }
}

impl<'de> Deserialize<'de> for Envelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_armored(&s).map_err(de::Error::custom)
    }
}
