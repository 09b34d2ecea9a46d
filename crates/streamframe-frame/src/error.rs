/// Errors that can occur while configuring or feeding a frame extractor.
///
/// Stream content never produces these: corrupt or partial frames are
/// dropped or deferred inside [`crate::FrameExtractor::extract`].
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A delimiter sequence contains a malformed escape.
    #[error("invalid byte sequence {input:?}: {reason}")]
    InvalidSequence { input: String, reason: String },

    /// The extractor configuration could not be parsed.
    #[error("invalid extractor config: {0}")]
    Config(#[from] serde_json::Error),

    /// An I/O error occurred while reading the byte stream.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
