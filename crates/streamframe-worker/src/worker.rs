use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use streamframe_frame::Frame;
use tracing::{debug, warn};

use crate::error::{Result, WorkerError};
use crate::message::{Command, Reply, Request, Response};
use crate::processor::{FrameProcessor, ProcessorStats, WorkerConfig};

/// Timeout used by the convenience wrappers.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

const THREAD_NAME: &str = "streamframe-worker";

/// Handle to a [`FrameProcessor`] running on its own thread.
///
/// The processor is moved into the thread; nothing is shared. Dropping the
/// handle asks the thread to stop and joins it.
pub struct Worker {
    tx: Option<Sender<Request>>,
    rx: Receiver<Response>,
    join: Option<JoinHandle<()>>,
    next_id: u64,
}

impl Worker {
    /// Start a worker thread that owns `processor`.
    pub fn spawn(processor: FrameProcessor) -> Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<Request>();
        let (response_tx, response_rx) = mpsc::channel::<Response>();

        let join = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || run(processor, request_rx, response_tx))
            .map_err(WorkerError::Spawn)?;
        debug!(thread = THREAD_NAME, "worker started");

        Ok(Self {
            tx: Some(request_tx),
            rx: response_rx,
            join: Some(join),
            next_id: 1,
        })
    }

    /// Queue `command` without waiting. Returns its correlation id.
    pub fn send(&mut self, command: Command) -> Result<u64> {
        let id = self.next_id;
        self.next_id += 1;
        let tx = self.tx.as_ref().ok_or(WorkerError::Disconnected)?;
        tx.send(Request { id, command })
            .map_err(|_| WorkerError::Disconnected)?;
        Ok(id)
    }

    /// Wait up to `timeout` for the next response, whatever its id.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Response> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => WorkerError::Timeout(timeout),
            RecvTimeoutError::Disconnected => WorkerError::Disconnected,
        })
    }

    /// Send `command` and wait for the response carrying the same id.
    ///
    /// Responses to earlier requests that nobody waited for are discarded.
    /// A [`Reply::Error`] becomes [`WorkerError::Remote`].
    pub fn request(&mut self, command: Command, timeout: Duration) -> Result<Reply> {
        let id = self.send(command)?;
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let response = self
                .recv_timeout(remaining)
                .map_err(|err| match err {
                    WorkerError::Timeout(_) => WorkerError::Timeout(timeout),
                    other => other,
                })?;

            if response.id != id {
                debug!(expected = id, received = response.id, "dropping stale response");
                continue;
            }
            return match response.reply {
                Reply::Error(message) => Err(WorkerError::Remote(message)),
                reply => Ok(reply),
            };
        }
    }

    /// Process one chunk on the worker thread.
    pub fn process(&mut self, data: Vec<u8>, timeout: Duration) -> Result<Vec<Frame>> {
        match self.request(Command::ProcessData(data), timeout)? {
            Reply::Frames(frames) => Ok(frames),
            other => Err(unexpected(other)),
        }
    }

    pub fn process_batch(&mut self, chunks: Vec<Vec<u8>>, timeout: Duration) -> Result<Vec<Frame>> {
        match self.request(Command::ProcessBatch(chunks), timeout)? {
            Reply::Frames(frames) => Ok(frames),
            other => Err(unexpected(other)),
        }
    }

    pub fn configure(&mut self, config: WorkerConfig, timeout: Duration) -> Result<()> {
        match self.request(Command::Configure(config), timeout)? {
            Reply::Configured => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    pub fn stats(&mut self, timeout: Duration) -> Result<ProcessorStats> {
        match self.request(Command::GetStats, timeout)? {
            Reply::Stats(stats) => Ok(stats),
            other => Err(unexpected(other)),
        }
    }

    pub fn reset(&mut self, timeout: Duration) -> Result<()> {
        match self.request(Command::Reset, timeout)? {
            Reply::Reset => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Stop the thread and wait for it to exit.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            let id = self.next_id;
            self.next_id += 1;
            // Ignored: a dead thread has already dropped its receiver.
            let _ = tx.send(Request {
                id,
                command: Command::Shutdown,
            });
        }
        if let Some(join) = self.join.take() {
            join.join().map_err(|_| WorkerError::Disconnected)?;
            debug!(thread = THREAD_NAME, "worker stopped");
        }
        Ok(())
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            warn!(%err, "worker thread did not stop cleanly");
        }
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("running", &self.join.is_some())
            .field("next_id", &self.next_id)
            .finish()
    }
}

fn unexpected(reply: Reply) -> WorkerError {
    WorkerError::Remote(format!("unexpected reply: {reply:?}"))
}

fn run(mut processor: FrameProcessor, requests: Receiver<Request>, responses: Sender<Response>) {
    // Ends on Shutdown or when the handle (and its sender) is dropped.
    while let Ok(Request { id, command }) = requests.recv() {
        let kind = command.kind();
        let (reply, stop) = match command {
            Command::Configure(config) => match processor.configure(&config) {
                Ok(()) => (Reply::Configured, false),
                Err(err) => (Reply::Error(err.to_string()), false),
            },
            Command::ProcessData(data) => (Reply::Frames(processor.process(&data)), false),
            Command::ProcessBatch(chunks) => (Reply::Frames(processor.process_batch(chunks)), false),
            Command::GetStats => (Reply::Stats(processor.stats()), false),
            Command::Reset => {
                processor.reset();
                (Reply::Reset, false)
            }
            Command::Shutdown => (Reply::ShuttingDown, true),
        };

        if responses.send(Response { id, reply }).is_err() {
            debug!(id, kind, "response receiver gone; stopping");
            break;
        }
        if stop {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(2);

    #[test]
    fn request_returns_matching_frames() {
        let mut worker = Worker::spawn(FrameProcessor::default()).unwrap();
        assert!(worker.process(b"1,".to_vec(), TIMEOUT).unwrap().is_empty());
        let frames = worker.process(b"2\n".to_vec(), TIMEOUT).unwrap();
        assert_eq!(frames[0].payload.as_ref(), b"1,2");
    }

    #[test]
    fn stale_responses_are_skipped() {
        let mut worker = Worker::spawn(FrameProcessor::default()).unwrap();
        let first = worker.send(Command::ProcessData(b"a\n".to_vec())).unwrap();
        let frames = worker.process(b"b\n".to_vec(), TIMEOUT).unwrap();

        assert!(first < worker.next_id);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload.as_ref(), b"b");
        assert_eq!(frames[0].sequence, 1);
    }

    #[test]
    fn remote_error_surfaces() {
        let mut worker = Worker::spawn(FrameProcessor::default()).unwrap();
        let err = worker
            .configure(
                WorkerConfig {
                    buffer_capacity: Some(0),
                    ..WorkerConfig::default()
                },
                TIMEOUT,
            )
            .unwrap_err();
        assert!(matches!(err, WorkerError::Remote(msg) if msg.contains("non-zero")));

        // The thread keeps serving after an error.
        assert!(worker.stats(TIMEOUT).is_ok());
    }

    #[test]
    fn shutdown_joins_thread() {
        let mut worker = Worker::spawn(FrameProcessor::default()).unwrap();
        worker.reset(TIMEOUT).unwrap();
        worker.shutdown().unwrap();
    }

    #[test]
    fn requests_after_thread_exit_fail() {
        let mut worker = Worker::spawn(FrameProcessor::default()).unwrap();
        let reply = worker.request(Command::Shutdown, TIMEOUT).unwrap();
        assert!(matches!(reply, Reply::ShuttingDown));

        let err = worker.request(Command::GetStats, TIMEOUT).unwrap_err();
        assert!(matches!(err, WorkerError::Disconnected));
    }
}
