//! Frame extraction on a dedicated thread.
//!
//! [`FrameProcessor`] bundles a ring and an extractor behind a
//! chunk-in/frames-out API. [`Worker`] moves a processor onto its own thread
//! and talks to it only through channels: each [`Request`] carries a
//! correlation id that the matching [`Response`] echoes.
//!
//! ```no_run
//! use std::time::Duration;
//! use streamframe_worker::{FrameProcessor, Worker};
//!
//! let mut worker = Worker::spawn(FrameProcessor::default())?;
//! let frames = worker.process(b"1,2,3\n".to_vec(), Duration::from_secs(1))?;
//! assert_eq!(frames[0].payload.as_ref(), b"1,2,3");
//! # Ok::<(), streamframe_worker::WorkerError>(())
//! ```

pub mod error;
pub mod message;
pub mod processor;
pub mod worker;

pub use error::{Result, WorkerError};
pub use message::{Command, Reply, Request, Response};
pub use processor::{FrameProcessor, ProcessorStats, WorkerConfig};
pub use worker::{Worker, DEFAULT_REQUEST_TIMEOUT};
