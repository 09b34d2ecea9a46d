//! Named checksum registry for frame integrity tails.
//!
//! Every algorithm produces a fixed-length tail that a device appends after a
//! frame (and its delimiters). The registry maps a configuration name such as
//! `"crc16"` or `"CRC-16"` to an [`Algorithm`] and computes or validates tails:
//!
//! - `none`: 0 bytes, always valid
//! - `sum`, `xor`, `crc8`: 1 byte
//! - `crc16`, `fletcher16`: 2 bytes
//! - `crc32`, `fletcher32`: 4 bytes
//! - `sha256`: 32 bytes (behind the `digest` feature)
//!
//! Unknown names never fail: they resolve to [`Algorithm::None`] and emit a
//! `tracing` warning so a misconfigured stream keeps flowing.

pub mod algorithm;
pub mod crc;
#[cfg(feature = "digest")]
pub mod digest;
pub mod registry;
pub mod sums;

pub use algorithm::{normalize_name, Algorithm};
pub use registry::{checksum, length_of, validate, ChecksumRegistry, Checksummer};
