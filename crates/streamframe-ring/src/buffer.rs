use std::borrow::Cow;
use std::io;

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{Result, RingError};
use crate::kmp::KmpPattern;

/// Default ring capacity: 10 MiB, enough for sustained high-rate serial
/// devices between extraction passes.
pub const DEFAULT_CAPACITY: usize = 10 * 1024 * 1024;

/// Fixed-capacity circular byte store with overwrite-on-overflow semantics.
///
/// Logical offsets used by every method are relative to the oldest buffered
/// byte (`0..len()`), independent of where that byte physically lives.
#[derive(Clone)]
pub struct RingBuffer {
    buf: Box<[u8]>,
    head: usize,
    tail: usize,
    len: usize,
}

/// Point-in-time view of ring occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RingStats {
    pub size: usize,
    pub capacity: usize,
    pub free_space: usize,
    pub head: usize,
    pub tail: usize,
    pub utilization_percent: f64,
    pub max_contiguous_read: usize,
    pub max_contiguous_write: usize,
}

impl RingBuffer {
    /// Create a ring with [`DEFAULT_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a ring holding at most `capacity` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "ring capacity must be non-zero");
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Maximum number of bytes the ring can hold.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Bytes that can be appended without dropping old data.
    pub fn free_space(&self) -> usize {
        self.capacity() - self.len
    }

    /// Physical index of the oldest byte.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Physical index where the next byte will be written.
    pub fn tail(&self) -> usize {
        self.tail
    }

    /// Drop all buffered bytes without reallocating.
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }

    /// Reallocate to `capacity` bytes. Buffered data is discarded.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn set_capacity(&mut self, capacity: usize) {
        assert!(capacity > 0, "ring capacity must be non-zero");
        debug!(from = self.capacity(), to = capacity, "resizing ring buffer");
        self.buf = vec![0u8; capacity].into_boxed_slice();
        self.clear();
    }

    /// Byte at logical `index`.
    pub fn get(&self, index: usize) -> Option<u8> {
        (index < self.len).then(|| self.buf[(self.head + index) % self.capacity()])
    }

    /// Append `data`, overwriting the oldest bytes if it does not fit.
    ///
    /// Input longer than the capacity keeps only its last `capacity` bytes.
    pub fn append(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }

        let capacity = self.capacity();
        let src = if data.len() > capacity {
            &data[data.len() - capacity..]
        } else {
            data
        };
        let n = src.len();

        if n > self.free_space() {
            let overwrite = n - self.free_space();
            self.head = (self.head + overwrite) % capacity;
            self.len -= overwrite;
            trace!(dropped = overwrite, "ring overflow, oldest bytes dropped");
        }

        let first = n.min(capacity - self.tail);
        self.buf[self.tail..self.tail + first].copy_from_slice(&src[..first]);
        self.buf[..n - first].copy_from_slice(&src[first..]);

        self.tail = (self.tail + n) % capacity;
        self.len += n;
    }

    /// Remove and return the oldest `n` bytes.
    ///
    /// Contiguous data is returned as a borrow of the backing store; data
    /// that wraps is copied. The borrow ends before the next mutation.
    pub fn read(&mut self, n: usize) -> Result<Cow<'_, [u8]>> {
        if n > self.len {
            return Err(RingError::Underrun {
                requested: n,
                available: self.len,
            });
        }

        let capacity = self.capacity();
        let start = self.head;
        let first = n.min(capacity - start);
        self.head = (self.head + n) % capacity;
        self.len -= n;

        if first == n {
            return Ok(Cow::Borrowed(&self.buf[start..start + n]));
        }

        let mut out = Vec::with_capacity(n);
        out.extend_from_slice(&self.buf[start..]);
        out.extend_from_slice(&self.buf[..n - first]);
        Ok(Cow::Owned(out))
    }

    /// Copy of the oldest `n` bytes (clamped to `len()`); the ring is untouched.
    pub fn peek(&self, n: usize) -> Vec<u8> {
        self.peek_at(0, n)
    }

    /// Copy of `n` bytes starting at logical `offset` (clamped).
    pub fn peek_at(&self, offset: usize, n: usize) -> Vec<u8> {
        let (first, second) = self.segments(offset, n);
        let mut out = Vec::with_capacity(first.len() + second.len());
        out.extend_from_slice(first);
        out.extend_from_slice(second);
        out
    }

    /// Drop up to `n` of the oldest bytes. Returns how many were dropped.
    pub fn skip(&mut self, n: usize) -> usize {
        let n = n.min(self.len);
        self.head = (self.head + n) % self.capacity();
        self.len -= n;
        n
    }

    /// Every buffered byte, oldest first.
    pub fn to_vec(&self) -> Vec<u8> {
        self.peek(self.len)
    }

    /// Logical offset of the first occurrence of `pattern` at or after `from`.
    ///
    /// Builds a fresh failure table; prefer [`find_pattern_with`] for
    /// delimiters that are searched repeatedly.
    ///
    /// [`find_pattern_with`]: Self::find_pattern_with
    pub fn find_pattern(&self, pattern: &[u8], from: usize) -> Option<usize> {
        if pattern.is_empty() || self.len.saturating_sub(from) < pattern.len() {
            return None;
        }
        self.find_pattern_with(&KmpPattern::new(pattern), from)
    }

    /// Like [`find_pattern`](Self::find_pattern) with a prebuilt table.
    ///
    /// Runs over the (at most two) physical regions that hold the logical
    /// range `from..len()`, so matches straddling the wrap point are found
    /// without linearizing the buffer.
    pub fn find_pattern_with(&self, pattern: &KmpPattern, from: usize) -> Option<usize> {
        self.find_pattern_within(pattern, from, self.len)
    }

    /// Search only the logical range `from..end`; a match must fit entirely
    /// inside it. `end` is clamped to `len()`.
    pub fn find_pattern_within(
        &self,
        pattern: &KmpPattern,
        from: usize,
        end: usize,
    ) -> Option<usize> {
        let end = end.min(self.len);
        if pattern.is_empty() || end.saturating_sub(from) < pattern.len() {
            return None;
        }
        let (first, second) = self.segments(from, end - from);
        pattern
            .find_in_segments(first, second)
            .map(|offset| offset + from)
    }

    /// Logical offset of the first byte at or after `from` matching `predicate`.
    pub fn position<P>(&self, from: usize, mut predicate: P) -> Option<usize>
    where
        P: FnMut(u8) -> bool,
    {
        let (first, second) = self.segments(from, self.len.saturating_sub(from));
        first
            .iter()
            .chain(second)
            .position(|&b| predicate(b))
            .map(|offset| offset + from)
    }

    /// Logical offsets of every (possibly overlapping) occurrence.
    pub fn find_all(&self, pattern: &[u8]) -> Vec<usize> {
        let kmp = KmpPattern::new(pattern);
        let mut found = Vec::new();
        let mut from = 0usize;
        while let Some(at) = self.find_pattern_with(&kmp, from) {
            found.push(at);
            from = at + 1;
        }
        found
    }

    /// Longest run of buffered bytes that is physically contiguous from head.
    pub fn max_contiguous_read(&self) -> usize {
        if self.len == 0 {
            return 0;
        }
        self.len.min(self.capacity() - self.head)
    }

    /// Longest run of free space that is physically contiguous from tail.
    pub fn max_contiguous_write(&self) -> usize {
        if self.is_full() {
            return 0;
        }
        self.free_space().min(self.capacity() - self.tail)
    }

    /// The contiguous readable region starting at the oldest byte.
    ///
    /// Pair with [`commit_read`](Self::commit_read) once consumed.
    pub fn read_view(&self) -> &[u8] {
        let n = self.max_contiguous_read();
        &self.buf[self.head..self.head + n]
    }

    /// The contiguous writable region starting at tail.
    ///
    /// An I/O layer may fill it directly, then call
    /// [`commit_write`](Self::commit_write) with the byte count transferred.
    pub fn write_view(&mut self) -> &mut [u8] {
        let n = self.max_contiguous_write();
        &mut self.buf[self.tail..self.tail + n]
    }

    /// Mark `n` bytes from [`read_view`](Self::read_view) as consumed.
    pub fn commit_read(&mut self, n: usize) -> Result<()> {
        let available = self.max_contiguous_read();
        if n > available {
            return Err(RingError::CommitOverflow {
                requested: n,
                available,
            });
        }
        self.head = (self.head + n) % self.capacity();
        self.len -= n;
        Ok(())
    }

    /// Mark `n` bytes written into [`write_view`](Self::write_view) as buffered.
    pub fn commit_write(&mut self, n: usize) -> Result<()> {
        let available = self.max_contiguous_write();
        if n > available {
            return Err(RingError::CommitOverflow {
                requested: n,
                available,
            });
        }
        self.tail = (self.tail + n) % self.capacity();
        self.len += n;
        Ok(())
    }

    /// Snapshot of occupancy counters.
    pub fn stats(&self) -> RingStats {
        RingStats {
            size: self.len,
            capacity: self.capacity(),
            free_space: self.free_space(),
            head: self.head,
            tail: self.tail,
            utilization_percent: (self.len as f64 / self.capacity() as f64) * 100.0,
            max_contiguous_read: self.max_contiguous_read(),
            max_contiguous_write: self.max_contiguous_write(),
        }
    }

    /// Physical regions backing the logical range `offset..offset + n`,
    /// clamped to the buffered data.
    fn segments(&self, offset: usize, n: usize) -> (&[u8], &[u8]) {
        let n = n.min(self.len.saturating_sub(offset));
        if n == 0 {
            return (&[], &[]);
        }
        let capacity = self.capacity();
        let start = (self.head + offset) % capacity;
        let first = n.min(capacity - start);
        (&self.buf[start..start + first], &self.buf[..n - first])
    }
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("len", &self.len)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .finish()
    }
}

/// Lets an upstream reader feed the ring with `std::io::copy`.
///
/// Writes never fail and never block; overflow follows [`RingBuffer::append`].
impl io::Write for RingBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
