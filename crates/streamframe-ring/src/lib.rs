//! Lossy fixed-capacity byte ring for device streams.
//!
//! This is the lowest layer of streamframe. An I/O layer appends raw bytes as
//! they arrive; the frame extractor searches and consumes them in place.
//!
//! - Overflow drops the oldest bytes (latest-wins window, no backpressure)
//! - Contiguous reads come back as zero-copy borrows
//! - Pattern search runs KMP directly over circular indices
//!
//! [`SharedRingBuffer`] adds a timeout-bounded lock for the rare case where
//! more than one producer or consumer must touch the same ring.

pub mod buffer;
pub mod error;
pub mod kmp;
pub mod shared;

pub use buffer::{RingBuffer, RingStats, DEFAULT_CAPACITY};
pub use error::{Result, RingError};
pub use kmp::KmpPattern;
pub use shared::{SharedRingBuffer, DEFAULT_LOCK_TIMEOUT};
