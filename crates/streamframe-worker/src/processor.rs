use bytes::Bytes;
use serde::{Deserialize, Serialize};
use streamframe_frame::{
    ConfigUpdate, ExtractorConfig, ExtractorStats, Frame, FrameDetection, FrameExtractor,
    OperationMode,
};
use streamframe_ring::{RingBuffer, RingStats, DEFAULT_CAPACITY};
use tracing::{debug, trace};

use crate::error::{Result, WorkerError};

/// Reconfiguration accepted by [`FrameProcessor::configure`].
///
/// Extractor fields sit at the top level next to `buffer_capacity`, so
/// `{"finish_sequence": "\r\n", "buffer_capacity": 4096}` is a valid document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    #[serde(flatten)]
    pub extractor: ConfigUpdate,
    /// New ring capacity; resizing discards buffered bytes.
    #[serde(alias = "bufferCapacity", skip_serializing_if = "Option::is_none")]
    pub buffer_capacity: Option<usize>,
}

impl From<ConfigUpdate> for WorkerConfig {
    fn from(extractor: ConfigUpdate) -> Self {
        Self {
            extractor,
            buffer_capacity: None,
        }
    }
}

impl From<ExtractorConfig> for WorkerConfig {
    fn from(config: ExtractorConfig) -> Self {
        ConfigUpdate::from(config).into()
    }
}

/// Snapshot returned by [`FrameProcessor::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProcessorStats {
    pub ring: RingStats,
    pub extractor: ExtractorStats,
    pub pending_frames: usize,
    pub chunks_processed: u64,
    pub bytes_processed: u64,
}

/// A ring and an extractor driven chunk by chunk.
#[derive(Debug, Clone)]
pub struct FrameProcessor {
    ring: RingBuffer,
    extractor: FrameExtractor,
    chunks_processed: u64,
    bytes_processed: u64,
}

impl Default for FrameProcessor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl FrameProcessor {
    /// Create a processor with a [`DEFAULT_CAPACITY`] ring.
    pub fn new(config: ExtractorConfig) -> Self {
        Self::with_parts(FrameExtractor::new(config), RingBuffer::with_capacity(DEFAULT_CAPACITY))
    }

    pub fn with_parts(extractor: FrameExtractor, ring: RingBuffer) -> Self {
        Self {
            ring,
            extractor,
            chunks_processed: 0,
            bytes_processed: 0,
        }
    }

    /// Feed one chunk and return every frame it completed.
    ///
    /// In project-file mode without delimiters each non-empty chunk is its
    /// own frame and never touches the ring.
    pub fn process(&mut self, data: &[u8]) -> Vec<Frame> {
        self.chunks_processed += 1;
        self.bytes_processed += data.len() as u64;

        if self.is_passthrough() {
            if !data.is_empty() {
                self.extractor.push_frame(Bytes::copy_from_slice(data));
            }
        } else {
            self.ring.append(data);
            self.extractor.extract(&mut self.ring);
        }

        let frames = self.extractor.take_frames();
        trace!(
            chunk_len = data.len(),
            frames = frames.len(),
            buffered = self.ring.len(),
            "processed chunk"
        );
        frames
    }

    /// Feed several chunks in order.
    pub fn process_batch<I, B>(&mut self, chunks: I) -> Vec<Frame>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut frames = Vec::new();
        for chunk in chunks {
            frames.extend(self.process(chunk.as_ref()));
        }
        frames
    }

    /// Apply `config`. A zero `buffer_capacity` is rejected before anything
    /// changes.
    pub fn configure(&mut self, config: &WorkerConfig) -> Result<()> {
        if config.buffer_capacity == Some(0) {
            return Err(WorkerError::InvalidConfig(
                "buffer capacity must be non-zero".to_string(),
            ));
        }

        self.extractor.update(&config.extractor);
        if let Some(capacity) = config.buffer_capacity {
            if capacity != self.ring.capacity() {
                self.ring.set_capacity(capacity);
            }
        }
        debug!(
            capacity = self.ring.capacity(),
            mode = %self.extractor.config().operation_mode,
            "processor configured"
        );
        Ok(())
    }

    pub fn stats(&self) -> ProcessorStats {
        ProcessorStats {
            ring: self.ring.stats(),
            extractor: self.extractor.stats(),
            pending_frames: self.extractor.pending(),
            chunks_processed: self.chunks_processed,
            bytes_processed: self.bytes_processed,
        }
    }

    /// Drop buffered bytes, pending frames and counters.
    pub fn reset(&mut self) {
        self.ring.clear();
        self.extractor.reset();
        self.chunks_processed = 0;
        self.bytes_processed = 0;
    }

    /// Up to `count` of the oldest buffered bytes, not yet part of a frame.
    pub fn historical_data(&self, count: usize) -> Vec<u8> {
        self.ring.peek(count)
    }

    pub fn extractor(&self) -> &FrameExtractor {
        &self.extractor
    }

    pub fn ring(&self) -> &RingBuffer {
        &self.ring
    }

    fn is_passthrough(&self) -> bool {
        let config = self.extractor.config();
        config.operation_mode == OperationMode::ProjectFile
            && config.frame_detection == FrameDetection::NoDelimiters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payloads(frames: &[Frame]) -> Vec<&[u8]> {
        frames.iter().map(|f| f.payload.as_ref()).collect()
    }

    #[test]
    fn process_carries_partial_frames_between_chunks() {
        let mut processor = FrameProcessor::default();
        assert!(processor.process(b"12,3").is_empty());
        let frames = processor.process(b"4\n56");
        assert_eq!(payloads(&frames), vec![&b"12,34"[..]]);
        assert_eq!(processor.historical_data(10), b"56");
        assert_eq!(processor.historical_data(1), b"5");
    }

    #[test]
    fn passthrough_emits_each_chunk() {
        let mut processor = FrameProcessor::new(ExtractorConfig::project_file(
            FrameDetection::NoDelimiters,
            Vec::new(),
            Vec::new(),
            "",
        ));
        let frames = processor.process_batch([&b"ab"[..], b"", b"cd"]);
        assert_eq!(payloads(&frames), vec![&b"ab"[..], b"cd"]);
        assert_eq!(frames[1].sequence, 1);
        assert!(processor.ring().is_empty());
        assert_eq!(processor.stats().chunks_processed, 3);
    }

    #[test]
    fn configure_resizes_ring_and_merges_fields() {
        let mut processor = FrameProcessor::default();
        processor.process(b"leftover");

        let config: WorkerConfig = serde_json::from_str(
            r#"{ "operationMode": "project-file", "finishSequence": ";", "bufferCapacity": 32 }"#,
        )
        .unwrap();
        processor.configure(&config).unwrap();

        assert_eq!(processor.ring().capacity(), 32);
        assert!(processor.ring().is_empty());
        assert_eq!(processor.extractor().config().finish_sequence, b";");
        assert_eq!(
            processor.extractor().config().frame_detection,
            FrameDetection::EndDelimiter
        );
        assert_eq!(payloads(&processor.process(b"a;b;")), vec![&b"a"[..], b"b"]);
    }

    #[test]
    fn configure_rejects_zero_capacity() {
        let mut processor = FrameProcessor::default();
        let err = processor
            .configure(&WorkerConfig {
                buffer_capacity: Some(0),
                ..WorkerConfig::default()
            })
            .unwrap_err();
        assert!(matches!(err, WorkerError::InvalidConfig(_)));
        assert_eq!(processor.ring().capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn reset_restarts_sequences_and_counters() {
        let mut processor = FrameProcessor::default();
        processor.process(b"a\nb\npartial");
        processor.reset();

        let stats = processor.stats();
        assert_eq!(stats.ring.size, 0);
        assert_eq!(stats.extractor, ExtractorStats::default());
        assert_eq!(stats.bytes_processed, 0);
        assert_eq!(processor.process(b"c\n")[0].sequence, 0);
    }

    #[test]
    fn stats_serialize_to_json() {
        let mut processor = FrameProcessor::default();
        processor.process(b"x\n");
        let json = serde_json::to_value(processor.stats()).unwrap();
        assert_eq!(json["extractor"]["frames_extracted"], 1);
        assert_eq!(json["chunks_processed"], 1);
        assert_eq!(json["ring"]["capacity"], DEFAULT_CAPACITY);
    }
}
