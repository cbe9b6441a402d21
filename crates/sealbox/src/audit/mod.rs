//! Ciphertext and binary audit helpers.
//!
//! Two pure checks over untrusted bytes:
//!
//! - [`detect_repeated_blocks`] flags the block-repetition pattern that a
//!   codebook-mode ciphertext leaks. Envelopes from this crate never show it.
//! - [`scan_signatures`] looks for names of crypto primitives and libraries
//!   embedded in a binary, marking weak ones.
//!
//! [`scan`] runs both and summarises the result as a [`ScanReport`].

pub mod blocks;
pub mod signatures;

pub use blocks::{detect_repeated_blocks, BlockRepetition};
pub use signatures::{scan_signatures, Category, Finding};

use serde::Serialize;
use tracing::debug;

/// Default block size: the AES block.
pub const DEFAULT_BLOCK_SIZE: usize = 16;

/// Parameters for [`scan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditConfig {
    pub block_size: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

/// Combined result of a signature scan and a repeated-block check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub bytes_scanned: usize,
    pub findings: Vec<Finding>,
    pub block_repetition: BlockRepetition,
    /// Weak findings, plus one if the content looks codebook-encrypted.
    pub vulnerabilities: usize,
}

/// Scan `content` for known signatures and repeated blocks.
pub fn scan(content: &[u8], cfg: &AuditConfig) -> ScanReport {
    let findings = scan_signatures(content);
    let block_repetition = detect_repeated_blocks(content, cfg.block_size);

    let vulnerabilities = findings.iter().filter(|f| f.weak).count()
        + usize::from(block_repetition.is_ecb_like());

    debug!(
        bytes = content.len(),
        findings = findings.len(),
        vulnerabilities,
        "scan complete"
    );

    ScanReport {
        bytes_scanned: content.len(),
        findings,
        block_repetition,
        vulnerabilities,
    }
}
