use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use serde::Serialize;

/// Outcome of checking a candidate frame against its checksum tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// No checksum configured, or the tail matched.
    Ok,
    /// The tail was present but did not match; the frame is discarded.
    ChecksumError,
    /// The tail is not fully buffered yet.
    Incomplete,
}

/// An extracted frame payload, stripped of delimiters and checksum tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Monotonic per-extractor sequence number, starting at 0.
    pub sequence: u64,
    /// The frame payload.
    pub payload: Bytes,
    /// Validation outcome. Queued frames are always [`ValidationStatus::Ok`].
    pub status: ValidationStatus,
    /// Wall-clock time the frame was extracted.
    pub timestamp: SystemTime,
}

impl Frame {
    /// Create a new, valid frame stamped with the current time.
    pub fn new(sequence: u64, payload: impl Into<Bytes>) -> Self {
        Self::with_timestamp(sequence, payload, SystemTime::now())
    }

    pub fn with_timestamp(sequence: u64, payload: impl Into<Bytes>, timestamp: SystemTime) -> Self {
        Self {
            sequence,
            payload: payload.into(),
            status: ValidationStatus::Ok,
            timestamp,
        }
    }

    /// Milliseconds since the Unix epoch; 0 for clocks set before it.
    pub fn timestamp_millis(&self) -> u64 {
        self.timestamp
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }

    pub fn is_valid(&self) -> bool {
        self.status == ValidationStatus::Ok
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Payload as text, replacing invalid UTF-8.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.payload
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.sequence, self.text())
    }
}

/// Lowercase hex rendering of `bytes`, two digits per byte.
pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
