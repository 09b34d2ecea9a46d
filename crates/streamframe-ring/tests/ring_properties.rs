//! Property-based tests for the ring buffer.
//!
//! These tests use proptest to verify invariants hold for arbitrary inputs:
//! - Appends within capacity lose nothing
//! - Overflow retains exactly the latest `capacity` bytes
//! - Split reads equal a single read
//! - Peeking never moves the cursors
//! - Pattern search agrees with a naive scan, wrapped or not

use proptest::prelude::*;
use streamframe_ring::RingBuffer;

// Capacity plus an initial head offset, so rings start at arbitrary
// physical positions.
fn ring_strategy() -> impl Strategy<Value = RingBuffer> {
    (1usize..=64)
        .prop_flat_map(|capacity| (Just(capacity), 0..capacity))
        .prop_map(|(capacity, offset)| {
            let mut ring = RingBuffer::with_capacity(capacity);
            ring.append(&vec![0u8; offset]);
            ring.skip(offset);
            ring
        })
}

fn chunks_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..48), 0..8)
}

#[test]
fn prop_appends_within_capacity_are_lossless() {
    proptest!(|(mut ring in ring_strategy(), chunks in chunks_strategy())| {
        let mut expected = Vec::new();
        for chunk in &chunks {
            if expected.len() + chunk.len() > ring.capacity() {
                break;
            }
            ring.append(chunk);
            expected.extend_from_slice(chunk);
        }

        prop_assert_eq!(ring.len(), expected.len());
        prop_assert_eq!(ring.peek(ring.len()), expected);
    });
}

#[test]
fn prop_overflow_retains_latest_bytes() {
    proptest!(|(mut ring in ring_strategy(), chunks in chunks_strategy())| {
        let all: Vec<u8> = chunks.concat();
        for chunk in &chunks {
            ring.append(chunk);
        }

        let keep = all.len().min(ring.capacity());
        prop_assert_eq!(ring.len(), keep);
        prop_assert_eq!(ring.to_vec(), all[all.len() - keep..].to_vec());
        if all.len() > ring.capacity() {
            prop_assert!(ring.is_full());
        }
    });
}

#[test]
fn prop_split_read_matches_single_read() {
    proptest!(|(ring in ring_strategy(), data in prop::collection::vec(any::<u8>(), 2..64), split in any::<prop::sample::Index>())| {
        let mut a = ring;
        a.append(&data);
        let size = a.len();
        prop_assume!(size >= 2);

        let mut b = a.clone();

        let n = 1 + split.index(size - 1);
        let mut joined = a.read(n).unwrap().into_owned();
        joined.extend_from_slice(&a.read(size - n).unwrap());
        let single = b.read(size).unwrap().into_owned();

        prop_assert_eq!(joined, single);
        prop_assert!(a.is_empty());
    });
}

#[test]
fn prop_peek_does_not_mutate() {
    proptest!(|(mut ring in ring_strategy(), data in prop::collection::vec(any::<u8>(), 0..64), n in 0usize..80)| {
        ring.append(&data);
        let (len, head, tail) = (ring.len(), ring.head(), ring.tail());

        let first = ring.peek(n);
        let second = ring.peek(n);

        prop_assert_eq!(first.len(), n.min(len));
        prop_assert_eq!(first, second);
        prop_assert_eq!((ring.len(), ring.head(), ring.tail()), (len, head, tail));
    });
}

#[test]
fn prop_find_pattern_matches_naive_scan() {
    proptest!(|(mut ring in ring_strategy(),
                data in prop::collection::vec(0u8..4, 0..64),
                pattern in prop::collection::vec(0u8..4, 1..4),
                from in 0usize..16)| {
        ring.append(&data);
        let content = ring.to_vec();

        let naive = if from >= content.len() {
            None
        } else {
            content[from..]
                .windows(pattern.len())
                .position(|w| w == pattern.as_slice())
                .map(|i| i + from)
        };

        prop_assert_eq!(ring.find_pattern(&pattern, from), naive);
    });
}
