//! Byte-signature scan for embedded crypto primitives and libraries.

use serde::Serialize;

/// Broad class of a recognised signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    SymmetricCipher,
    AsymmetricCipher,
    HashFunction,
    Library,
}

struct Signature {
    pattern: &'static [u8],
    primitive: &'static str,
    category: Category,
    weak: bool,
}

const SIGNATURES: &[Signature] = &[
    Signature {
        pattern: b"AES",
        primitive: "AES",
        category: Category::SymmetricCipher,
        weak: false,
    },
    Signature {
        pattern: b"RSA",
        primitive: "RSA",
        category: Category::AsymmetricCipher,
        weak: false,
    },
    Signature {
        pattern: b"SHA256",
        primitive: "SHA-256",
        category: Category::HashFunction,
        weak: false,
    },
    Signature {
        pattern: b"OpenSSL",
        primitive: "OpenSSL Library",
        category: Category::Library,
        weak: false,
    },
    Signature {
        pattern: b"mbed TLS",
        primitive: "mbedTLS Library",
        category: Category::Library,
        weak: false,
    },
    Signature {
        pattern: b"libgcrypt",
        primitive: "Libgcrypt Library",
        category: Category::Library,
        weak: false,
    },
    Signature {
        pattern: b"MD5",
        primitive: "MD5",
        category: Category::HashFunction,
        weak: true,
    },
];

/// One recognised signature and where it first occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub offset: usize,
    pub primitive: &'static str,
    pub category: Category,
    /// The primitive is considered broken for new designs.
    pub weak: bool,
}

/// Report the first occurrence of every known signature in `content`.
///
/// Findings come back in signature-table order, at most one per signature.
pub fn scan_signatures(content: &[u8]) -> Vec<Finding> {
    SIGNATURES
        .iter()
        .filter_map(|sig| {
            find(content, sig.pattern).map(|offset| Finding {
                offset,
                primitive: sig.primitive,
                category: sig.category,
                weak: sig.weak,
            })
        })
        .collect()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
