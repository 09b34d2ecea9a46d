//! Timeout-bounded shared access to a single ring.
//!
//! Only needed when an embedding cannot keep one producer and one consumer
//! per ring. Prefer moving bytes over a channel to a thread that owns the
//! ring outright.

use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::thread;
use std::time::{Duration, Instant};

use crate::buffer::{RingBuffer, RingStats};
use crate::error::{Result, RingError};

/// Default time to wait for the ring lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// A cloneable handle to a ring guarded by a timeout-bounded lock.
///
/// Lock acquisition that exceeds the timeout returns
/// [`RingError::LockTimeout`] instead of blocking forever.
#[derive(Clone, Debug)]
pub struct SharedRingBuffer {
    inner: Arc<Mutex<RingBuffer>>,
    timeout: Duration,
}

impl SharedRingBuffer {
    /// Wrap `ring` with [`DEFAULT_LOCK_TIMEOUT`].
    pub fn new(ring: RingBuffer) -> Self {
        Self::with_timeout(ring, DEFAULT_LOCK_TIMEOUT)
    }

    /// Wrap `ring` with an explicit lock timeout.
    pub fn with_timeout(ring: RingBuffer, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ring)),
            timeout,
        }
    }

    /// Configured lock timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Acquire exclusive access, polling until the timeout elapses.
    ///
    /// A lock poisoned by a panicking holder is recovered: the ring holds
    /// plain bytes and every mutation leaves it consistent.
    pub fn lock(&self) -> Result<MutexGuard<'_, RingBuffer>> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match self.inner.try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::Poisoned(poisoned)) => return Ok(poisoned.into_inner()),
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        return Err(RingError::LockTimeout(self.timeout));
                    }
                    thread::sleep(LOCK_POLL_INTERVAL);
                }
            }
        }
    }

    /// Locked [`RingBuffer::append`].
    pub fn append(&self, data: &[u8]) -> Result<()> {
        self.lock()?.append(data);
        Ok(())
    }

    /// Locked [`RingBuffer::read`]; the bytes are always copied out.
    pub fn read(&self, n: usize) -> Result<Vec<u8>> {
        let mut ring = self.lock()?;
        let bytes = ring.read(n)?;
        Ok(bytes.into_owned())
    }

    /// Locked [`RingBuffer::peek`].
    pub fn peek(&self, n: usize) -> Result<Vec<u8>> {
        Ok(self.lock()?.peek(n))
    }

    /// Locked [`RingBuffer::len`].
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Locked [`RingBuffer::is_empty`].
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Locked [`RingBuffer::free_space`].
    pub fn free_space(&self) -> Result<usize> {
        Ok(self.lock()?.free_space())
    }

    /// Locked [`RingBuffer::clear`].
    pub fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    /// Locked [`RingBuffer::stats`].
    pub fn stats(&self) -> Result<RingStats> {
        Ok(self.lock()?.stats())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn producer_and_consumer_threads_share_ring() {
        let shared = SharedRingBuffer::new(RingBuffer::with_capacity(1024));

        let producer = {
            let shared = shared.clone();
            thread::spawn(move || {
                for i in 0..100u8 {
                    shared.append(&[i]).unwrap();
                }
            })
        };
        producer.join().unwrap();

        assert_eq!(shared.len().unwrap(), 100);
        let bytes = shared.read(100).unwrap();
        assert_eq!(bytes, (0..100u8).collect::<Vec<_>>());
        assert!(shared.is_empty().unwrap());
    }

    #[test]
    fn held_lock_times_out() {
        let shared =
            SharedRingBuffer::with_timeout(RingBuffer::with_capacity(16), Duration::from_millis(20));
        let (locked_tx, locked_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let holder = {
            let shared = shared.clone();
            thread::spawn(move || {
                let _guard = shared.lock().unwrap();
                locked_tx.send(()).unwrap();
                let _ = release_rx.recv();
            })
        };

        locked_rx.recv().unwrap();
        let err = shared.append(b"late").unwrap_err();
        assert_eq!(err, RingError::LockTimeout(Duration::from_millis(20)));

        release_tx.send(()).unwrap();
        holder.join().unwrap();
        assert!(shared.append(b"ok").is_ok());
    }

    #[test]
    fn read_underrun_propagates() {
        let shared = SharedRingBuffer::new(RingBuffer::with_capacity(4));
        shared.append(b"ab").unwrap();
        assert!(matches!(
            shared.read(3),
            Err(RingError::Underrun {
                requested: 3,
                available: 2
            })
        ));
    }
}
