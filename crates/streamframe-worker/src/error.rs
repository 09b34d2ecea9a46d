use std::time::Duration;

/// Errors that can occur while driving a frame worker.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The worker thread could not be started.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The worker thread is gone (shut down or panicked).
    #[error("worker disconnected")]
    Disconnected,

    /// No matching response arrived in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// A configuration the processor refuses to apply.
    #[error("invalid worker config: {0}")]
    InvalidConfig(String),

    /// The worker reported a failure for this request.
    #[error("worker error: {0}")]
    Remote(String),
}

pub type Result<T> = std::result::Result<T, WorkerError>;
