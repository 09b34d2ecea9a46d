use std::time::Duration;

/// Errors raised by ring buffer misuse.
///
/// None of these describe stream content; they indicate a caller asked for
/// more than the ring can give.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    /// A read requested more bytes than are buffered.
    #[error("buffer underrun (requested {requested} bytes, {available} available)")]
    Underrun { requested: usize, available: usize },

    /// A commit exceeded the advertised contiguous span.
    #[error("commit of {requested} bytes exceeds contiguous span of {available}")]
    CommitOverflow { requested: usize, available: usize },

    /// The shared ring lock could not be acquired in time.
    #[error("ring lock not acquired within {0:?}")]
    LockTimeout(Duration),
}

pub type Result<T> = std::result::Result<T, RingError>;
