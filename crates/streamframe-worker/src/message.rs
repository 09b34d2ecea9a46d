use streamframe_frame::Frame;

use crate::processor::{ProcessorStats, WorkerConfig};

/// Work the worker thread can be asked to do.
#[derive(Debug, Clone)]
pub enum Command {
    /// Merge a configuration update (and optionally resize the ring).
    Configure(WorkerConfig),
    /// Append one chunk and extract.
    ProcessData(Vec<u8>),
    /// Append several chunks in order, extracting after each.
    ProcessBatch(Vec<Vec<u8>>),
    GetStats,
    /// Clear the ring, pending frames and sequence numbering.
    Reset,
    /// Stop the thread after acknowledging.
    Shutdown,
}

impl Command {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Configure(_) => "configure",
            Command::ProcessData(_) => "process_data",
            Command::ProcessBatch(_) => "process_batch",
            Command::GetStats => "get_stats",
            Command::Reset => "reset",
            Command::Shutdown => "shutdown",
        }
    }
}

/// A command tagged with a caller-chosen correlation id.
#[derive(Debug, Clone)]
pub struct Request {
    pub id: u64,
    pub command: Command,
}

/// Outcome of a single command.
#[derive(Debug, Clone)]
pub enum Reply {
    Configured,
    Frames(Vec<Frame>),
    Stats(ProcessorStats),
    Reset,
    ShuttingDown,
    Error(String),
}

/// A reply carrying the id of the request it answers.
#[derive(Debug, Clone)]
pub struct Response {
    pub id: u64,
    pub reply: Reply,
}
