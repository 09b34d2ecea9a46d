//! Frame extraction for serial and device byte streams.
//!
//! streamframe turns a continuous, lossy byte stream into discrete frames:
//! bytes land in a fixed-capacity ring, a configurable extractor finds frame
//! boundaries and validates checksum tails, and complete payloads come out in
//! arrival order.
//!
//! # Crate Structure
//!
//! - [`checksum`]: Named checksum registry (sum, xor, CRC, Fletcher, SHA-256)
//! - [`ring`]: Overwriting ring buffer with wrap-aware KMP search
//! - [`frame`]: Frame extractor, configuration, readers and codec
//! - [`worker`]: Dedicated processing thread (behind `worker` feature)

/// Re-export checksum types.
pub mod checksum {
    pub use streamframe_checksum::*;
}

/// Re-export ring buffer types.
pub mod ring {
    pub use streamframe_ring::*;
}

/// Re-export frame types.
pub mod frame {
    pub use streamframe_frame::*;
}

/// Re-export worker types (requires `worker` feature).
#[cfg(feature = "worker")]
pub mod worker {
    pub use streamframe_worker::*;
}
