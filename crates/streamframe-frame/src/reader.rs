use std::io::{ErrorKind, Read};

use streamframe_ring::RingBuffer;

use crate::error::{FrameError, Result};
use crate::extractor::FrameExtractor;
use crate::frame::Frame;

/// Default number of bytes requested from the source per read.
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024;

/// Pulls frames out of any `Read` source.
///
/// Bytes flow source → ring → extractor. Reads happen only when the
/// extractor has no queued frame, so callers see frames as soon as their
/// terminator arrives.
pub struct FrameReader<T> {
    inner: T,
    ring: RingBuffer,
    extractor: FrameExtractor,
    chunk: Vec<u8>,
    bytes_read: u64,
}

impl<T: Read> FrameReader<T> {
    /// Create a reader with a default-capacity ring.
    pub fn new(inner: T, extractor: FrameExtractor) -> Self {
        Self::with_ring(inner, extractor, RingBuffer::new())
    }

    /// Create a reader over an explicit ring.
    pub fn with_ring(inner: T, extractor: FrameExtractor, ring: RingBuffer) -> Self {
        Self {
            inner,
            ring,
            extractor,
            chunk: vec![0u8; DEFAULT_CHUNK_SIZE],
            bytes_read: 0,
        }
    }

    /// Set the per-read chunk size (at least one byte).
    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        self.chunk.resize(chunk_size.max(1), 0);
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk.len()
    }

    /// Read the next frame (blocking).
    ///
    /// Returns `Ok(None)` at end of input. Bytes of an unterminated trailing
    /// frame are left in the ring.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            if let Some(frame) = self.extractor.next_frame() {
                return Ok(Some(frame));
            }

            let read = match self.inner.read(&mut self.chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };
            if read == 0 {
                return Ok(None);
            }

            self.bytes_read += read as u64;
            self.ring.append(&self.chunk[..read]);
            self.extractor.extract(&mut self.ring);
        }
    }

    /// Total bytes pulled from the source.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Bytes buffered but not yet part of a complete frame.
    pub fn buffered(&self) -> usize {
        self.ring.len()
    }

    pub fn ring(&self) -> &RingBuffer {
        &self.ring
    }

    pub fn extractor(&self) -> &FrameExtractor {
        &self.extractor
    }

    pub fn extractor_mut(&mut self) -> &mut FrameExtractor {
        &mut self.extractor
    }

    /// Consume the reader and return the inner source.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read> Iterator for FrameReader<T> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_frame().transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::config::{ExtractorConfig, FrameDetection};

    #[derive(Debug)]
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    #[test]
    fn reads_lines_until_eof() {
        let mut reader = FrameReader::new(
            Cursor::new(b"1\n2\r\n3".to_vec()),
            FrameExtractor::default(),
        );

        assert_eq!(reader.read_frame().unwrap().unwrap().payload.as_ref(), b"1");
        assert_eq!(reader.read_frame().unwrap().unwrap().payload.as_ref(), b"2");
        assert!(reader.read_frame().unwrap().is_none());
        assert_eq!(reader.buffered(), 1);
        assert_eq!(reader.bytes_read(), 6);
    }

    #[test]
    fn byte_by_byte_source_with_checksum() {
        let tail = streamframe_checksum::checksum("crc8", b"slow");
        let mut wire = b"<slow>".to_vec();
        wire.extend_from_slice(&tail);

        let config = ExtractorConfig::project_file(
            FrameDetection::StartAndEndDelimiter,
            b"<".to_vec(),
            b">".to_vec(),
            "crc8",
        );
        let reader = FrameReader::new(
            ByteByByteReader { bytes: wire, pos: 0 },
            FrameExtractor::new(config),
        );

        let frames: Vec<Frame> = reader.collect::<Result<_>>().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload.as_ref(), b"slow");
    }

    #[test]
    fn small_ring_drops_oldest_bytes() {
        let mut reader = FrameReader::with_ring(
            Cursor::new(b"abcdefgh\n".to_vec()),
            FrameExtractor::default(),
            RingBuffer::with_capacity(4),
        );
        reader.set_chunk_size(9);

        let frame = reader.read_frame().unwrap().unwrap();
        assert_eq!(frame.payload.as_ref(), b"fgh");
    }

    #[test]
    fn reads_use_configured_chunk_size() {
        struct Recording {
            data: Cursor<Vec<u8>>,
            sizes: Vec<usize>,
        }
        impl Read for Recording {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                self.sizes.push(buf.len());
                self.data.read(buf)
            }
        }

        let source = Recording {
            data: Cursor::new(b"ab\ncd\nef\n".to_vec()),
            sizes: Vec::new(),
        };
        let mut reader = FrameReader::new(source, FrameExtractor::default());
        reader.set_chunk_size(0);
        assert_eq!(reader.chunk_size(), 1);
        reader.set_chunk_size(4);

        let frames: Vec<Frame> = reader.by_ref().collect::<Result<_>>().unwrap();
        assert_eq!(frames.len(), 3);
        let source = reader.into_inner();
        assert!(source.sizes.len() >= 3);
        assert!(source.sizes.iter().all(|&size| size == 4));
    }

    #[test]
    fn io_errors_propagate() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("gone"))
            }
        }

        let mut reader = FrameReader::new(Broken, FrameExtractor::default());
        assert!(matches!(reader.read_frame(), Err(FrameError::Io(_))));
    }
}
