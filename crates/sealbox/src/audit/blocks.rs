//! Repeated-block detection: the fingerprint a codebook-mode ciphertext leaves.

use std::collections::hash_map::{Entry, HashMap};

use serde::Serialize;

/// How often full blocks of a buffer repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRepetition {
    pub block_size: usize,
    /// Full blocks examined. A trailing partial block is ignored.
    pub total_blocks: usize,
    pub distinct_blocks: usize,
    /// `total_blocks - distinct_blocks`.
    pub repeated_blocks: usize,
    /// Block indices of the first repeat found: (original, duplicate).
    pub first_repeat: Option<(usize, usize)>,
}

impl BlockRepetition {
    fn empty(block_size: usize) -> Self {
        Self {
            block_size,
            total_blocks: 0,
            distinct_blocks: 0,
            repeated_blocks: 0,
            first_repeat: None,
        }
    }

    /// True when any block repeats, which randomized modes make negligibly
    /// unlikely for real ciphertext.
    pub fn is_ecb_like(&self) -> bool {
        self.repeated_blocks > 0
    }
}

/// Split `data` into `block_size` chunks and count duplicates.
///
/// A `block_size` of zero yields an empty report.
pub fn detect_repeated_blocks(data: &[u8], block_size: usize) -> BlockRepetition {
    if block_size == 0 {
        return BlockRepetition::empty(0);
    }

    let mut seen: HashMap<&[u8], usize> = HashMap::new();
    let mut report = BlockRepetition::empty(block_size);

    for (index, block) in data.chunks_exact(block_size).enumerate() {
        report.total_blocks += 1;
        match seen.entry(block) {
            Entry::Occupied(first) => {
                report.first_repeat.get_or_insert((*first.get(), index));
            }
            Entry::Vacant(slot) => {
                slot.insert(index);
            }
        }
    }

    report.distinct_blocks = seen.len();
    report.repeated_blocks = report.total_blocks - report.distinct_blocks;
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_repeats() {
        let data = b"YELLOW SUBMARINEyellow submarineYELLOW SUBMARINEYELLOW SUBMARINE";
        let report = detect_repeated_blocks(data, 16);
        assert_eq!(report.total_blocks, 4);
        assert_eq!(report.distinct_blocks, 2);
        assert_eq!(report.repeated_blocks, 2);
        assert_eq!(report.first_repeat, Some((0, 2)));
        assert!(report.is_ecb_like());
    }

    #[test]
    fn distinct_blocks_are_clean() {
        let data: Vec<u8> = (0u8..64).collect();
        let report = detect_repeated_blocks(&data, 16);
        assert_eq!(report.total_blocks, 4);
        assert!(!report.is_ecb_like());
        assert_eq!(report.first_repeat, None);
    }

    #[test]
    fn trailing_partial_block_ignored() {
        let mut data = vec![0xAAu8; 16];
        data.extend_from_slice(&[0xAA; 15]);
        let report = detect_repeated_blocks(&data, 16);
        assert_eq!(report.total_blocks, 1);
        assert!(!report.is_ecb_like());
    }

    #[test]
    fn zero_block_size_is_empty() {
        let report = detect_repeated_blocks(b"anything", 0);
        assert_eq!(report.total_blocks, 0);
        assert!(!report.is_ecb_like());
    }
}
