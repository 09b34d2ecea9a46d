//! `tokio_util` codec adapter.

use bytes::BytesMut;
use streamframe_ring::RingBuffer;
use tokio_util::codec::Decoder;
use tracing::debug;

use crate::error::{FrameError, Result};
use crate::extractor::FrameExtractor;
use crate::frame::Frame;

/// Decoder that feeds incoming chunks through an owned ring and extractor.
///
/// Every byte handed to [`Decoder::decode`] is moved into the ring at once,
/// so the ring capacity (not the codec) bounds buffering. Use with
/// `tokio_util::codec::FramedRead` over any `AsyncRead`.
#[derive(Debug)]
pub struct ExtractorCodec {
    ring: RingBuffer,
    extractor: FrameExtractor,
}

impl ExtractorCodec {
    pub fn new(extractor: FrameExtractor) -> Self {
        Self::with_ring(extractor, RingBuffer::new())
    }

    pub fn with_ring(extractor: FrameExtractor, ring: RingBuffer) -> Self {
        Self { ring, extractor }
    }

    pub fn extractor(&self) -> &FrameExtractor {
        &self.extractor
    }

    pub fn extractor_mut(&mut self) -> &mut FrameExtractor {
        &mut self.extractor
    }

    pub fn ring(&self) -> &RingBuffer {
        &self.ring
    }
}

impl Decoder for ExtractorCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        if let Some(frame) = self.extractor.next_frame() {
            return Ok(Some(frame));
        }
        if src.is_empty() {
            return Ok(None);
        }

        self.ring.append(src);
        src.clear();
        self.extractor.extract(&mut self.ring);
        Ok(self.extractor.next_frame())
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        let frame = self.decode(src)?;
        if frame.is_none() && !self.ring.is_empty() {
            debug!(
                buffered = self.ring.len(),
                "stream ended with an unterminated frame"
            );
            self.ring.clear();
        }
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;
    use tokio::io::AsyncWriteExt;
    use tokio_util::codec::FramedRead;

    use super::*;
    use crate::config::ExtractorConfig;

    #[test]
    fn decode_queues_and_pops() {
        let mut codec = ExtractorCodec::new(FrameExtractor::default());
        let mut src = BytesMut::from(&b"a\nb\nc"[..]);

        assert_eq!(codec.decode(&mut src).unwrap().unwrap().payload.as_ref(), b"a");
        assert!(src.is_empty());
        assert_eq!(codec.decode(&mut src).unwrap().unwrap().payload.as_ref(), b"b");
        assert!(codec.decode(&mut src).unwrap().is_none());
        assert_eq!(codec.ring().len(), 1);
    }

    #[test]
    fn decode_eof_discards_partial_frame() {
        let mut codec = ExtractorCodec::new(FrameExtractor::default());
        let mut src = BytesMut::from(&b"tail"[..]);
        assert!(codec.decode_eof(&mut src).unwrap().is_none());
        assert!(codec.ring().is_empty());
    }

    #[tokio::test]
    async fn framed_read_over_duplex() {
        let (mut tx, rx) = tokio::io::duplex(64);
        let codec = ExtractorCodec::new(FrameExtractor::new(ExtractorConfig::device_json()));
        let mut frames = FramedRead::new(rx, codec);

        tokio::spawn(async move {
            tx.write_all(b"/*{\"t\":1}").await.unwrap();
            tx.write_all(b"*//*{\"t\":2}*/").await.unwrap();
        });

        let first = frames.next().await.unwrap().unwrap();
        let second = frames.next().await.unwrap().unwrap();
        assert_eq!(first.payload.as_ref(), b"{\"t\":1}");
        assert_eq!(second.payload.as_ref(), b"{\"t\":2}");
        assert_eq!(second.sequence, 1);
        assert!(frames.next().await.is_none());
    }
}
