//! Property-based tests for the CRC family.
//!
//! - A computed tail always validates against its own data
//! - Flipping any single data byte invalidates the tail

use proptest::prelude::*;
use streamframe_checksum::{Algorithm, ChecksumRegistry};

const CRCS: [Algorithm; 3] = [Algorithm::Crc8, Algorithm::Crc16, Algorithm::Crc32];

fn data_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..256)
}

#[test]
fn prop_crc_roundtrip_validates() {
    let registry = ChecksumRegistry::new();
    proptest!(|(data in data_strategy())| {
        for algorithm in &CRCS {
            let tail = registry.checksum(algorithm, &data, None);
            prop_assert_eq!(tail.len(), registry.length_of(algorithm));
            prop_assert!(registry.validate(algorithm, &data, &tail, None));
        }
    });
}

#[test]
fn prop_single_byte_flip_is_detected() {
    let registry = ChecksumRegistry::new();
    proptest!(|(data in data_strategy(), index in any::<prop::sample::Index>(), flip in 1u8..=255)| {
        let at = index.index(data.len());
        let mut corrupted = data.clone();
        corrupted[at] ^= flip;

        for algorithm in &CRCS {
            let tail = registry.checksum(algorithm, &data, None);
            prop_assert!(!registry.validate(algorithm, &corrupted, &tail, None));
        }
    });
}

#[test]
fn prop_seeded_roundtrip_validates() {
    let registry = ChecksumRegistry::new();
    proptest!(|(data in data_strategy(), seed in any::<u32>())| {
        for algorithm in &CRCS {
            let tail = registry.checksum(algorithm, &data, Some(seed));
            prop_assert!(registry.validate(algorithm, &data, &tail, Some(seed)));
        }
    });
}
