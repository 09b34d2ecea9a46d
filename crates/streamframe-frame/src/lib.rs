//! Frame extraction over a lossy byte ring.
//!
//! A [`FrameExtractor`] searches the bytes buffered in a
//! [`streamframe_ring::RingBuffer`] for frame boundaries, validates the
//! optional checksum tail and queues accepted payloads:
//!
//! - quick-plot: lines ending in `\n`, `\r` or `\r\n`
//! - device-json: payloads enclosed in a start and finish sequence
//! - project-file: no delimiters, end delimiter, start delimiter or both,
//!   with any registered checksum algorithm
//!
//! Corrupt frames are dropped and counted, never surfaced as errors.
//! Incomplete frames stay in the ring until more bytes arrive.

#[cfg(feature = "async")]
pub mod codec;
pub mod config;
pub mod error;
pub mod extractor;
pub mod frame;
pub mod reader;

#[cfg(feature = "async")]
pub use codec::ExtractorCodec;
pub use config::{escape, unescape, ConfigUpdate, ExtractorConfig, FrameDetection, OperationMode};
pub use error::{FrameError, Result};
pub use extractor::{ExtractorStats, FrameExtractor};
pub use frame::{hex, Frame, ValidationStatus};
pub use reader::{FrameReader, DEFAULT_CHUNK_SIZE};
