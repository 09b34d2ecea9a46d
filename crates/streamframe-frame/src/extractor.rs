use std::collections::VecDeque;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use streamframe_checksum::{Algorithm, ChecksumRegistry};
use streamframe_ring::{KmpPattern, RingBuffer};
use tracing::{debug, trace, warn};

use crate::config::{ConfigUpdate, ExtractorConfig, FrameDetection, OperationMode};
use crate::frame::{hex, Frame, ValidationStatus};

/// Counters accumulated across [`FrameExtractor::extract`] calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractorStats {
    pub frames_extracted: u64,
    pub checksum_errors: u64,
    pub empty_frames: u64,
    pub malformed_frames: u64,
    pub bytes_discarded: u64,
}

/// A terminator located in the ring: offset of its first byte and its length.
#[derive(Debug, Clone, Copy)]
struct Terminator {
    offset: usize,
    len: usize,
}

/// Turns a lossy byte ring into discrete, checksum-validated frames.
///
/// The extractor never owns the ring. Each [`extract`](Self::extract) call
/// searches the bytes currently buffered, consumes every complete frame (and
/// any garbage that can never become one) and leaves partial input in place
/// for the next call. Accepted frames wait in an internal queue until
/// drained with [`take_frames`](Self::take_frames).
#[derive(Debug, Clone)]
pub struct FrameExtractor {
    config: ExtractorConfig,
    registry: Arc<ChecksumRegistry>,
    algorithm: Algorithm,
    checksum_len: usize,
    start: KmpPattern,
    finish: KmpPattern,
    frames: VecDeque<Frame>,
    next_sequence: u64,
    stats: ExtractorStats,
}

impl Default for FrameExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl FrameExtractor {
    /// Create an extractor backed by the built-in checksum algorithms.
    pub fn new(config: ExtractorConfig) -> Self {
        Self::with_registry(config, Arc::new(ChecksumRegistry::new()))
    }

    /// Create an extractor that resolves checksum names against `registry`.
    pub fn with_registry(config: ExtractorConfig, registry: Arc<ChecksumRegistry>) -> Self {
        let mut extractor = Self {
            config: ExtractorConfig::default(),
            registry,
            algorithm: Algorithm::None,
            checksum_len: 0,
            start: KmpPattern::default(),
            finish: KmpPattern::default(),
            frames: VecDeque::new(),
            next_sequence: 0,
            stats: ExtractorStats::default(),
        };
        extractor.configure(config);
        extractor
    }

    /// Replace the whole configuration.
    pub fn configure(&mut self, config: ExtractorConfig) {
        self.config = config.normalized();
        self.refresh();
    }

    /// Merge the fields present in `update`.
    pub fn update(&mut self, update: &ConfigUpdate) {
        self.config.apply(update);
        self.refresh();
    }

    /// Switching away from project-file mode clears the checksum.
    pub fn set_operation_mode(&mut self, mode: OperationMode) {
        self.update(&ConfigUpdate {
            operation_mode: Some(mode),
            ..ConfigUpdate::default()
        });
    }

    pub fn set_frame_detection(&mut self, detection: FrameDetection) {
        self.update(&ConfigUpdate {
            frame_detection: Some(detection),
            ..ConfigUpdate::default()
        });
    }

    pub fn set_start_sequence(&mut self, sequence: impl Into<Vec<u8>>) {
        self.update(&ConfigUpdate {
            start_sequence: Some(sequence.into()),
            ..ConfigUpdate::default()
        });
    }

    pub fn set_finish_sequence(&mut self, sequence: impl Into<Vec<u8>>) {
        self.update(&ConfigUpdate {
            finish_sequence: Some(sequence.into()),
            ..ConfigUpdate::default()
        });
    }

    /// Set the checksum algorithm by name. Ignored outside project-file mode.
    pub fn set_checksum(&mut self, name: impl Into<String>) {
        self.update(&ConfigUpdate {
            checksum_algorithm: Some(name.into()),
            ..ConfigUpdate::default()
        });
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The resolved checksum algorithm.
    pub fn algorithm(&self) -> &Algorithm {
        &self.algorithm
    }

    /// Length of the checksum tail expected after each frame.
    pub fn checksum_len(&self) -> usize {
        self.checksum_len
    }

    pub fn registry(&self) -> &Arc<ChecksumRegistry> {
        &self.registry
    }

    fn refresh(&mut self) {
        self.algorithm = self.registry.resolve(&self.config.checksum_algorithm);
        self.checksum_len = self.registry.length_of(&self.algorithm);
        self.start = KmpPattern::new(self.config.start_sequence.clone());
        self.finish = KmpPattern::new(self.config.finish_sequence.clone());
        debug!(
            mode = %self.config.operation_mode,
            detection = %self.config.frame_detection,
            checksum = %self.algorithm,
            checksum_len = self.checksum_len,
            "extractor configured"
        );
    }

    /// Extract every frame currently available in `ring`.
    ///
    /// Returns how many frames were queued by this call. Bytes belonging to
    /// an incomplete frame stay in the ring.
    pub fn extract(&mut self, ring: &mut RingBuffer) -> usize {
        if ring.is_empty() {
            return 0;
        }

        let before = self.frames.len();
        match self.config.operation_mode {
            OperationMode::QuickPlot => self.extract_end_delimited(ring),
            OperationMode::DeviceJson => self.extract_enclosed(ring),
            OperationMode::ProjectFile => match self.config.frame_detection {
                FrameDetection::NoDelimiters => self.drain_all(ring),
                FrameDetection::EndDelimiter => self.extract_end_delimited(ring),
                FrameDetection::StartDelimiter => self.extract_start_delimited(ring),
                FrameDetection::StartAndEndDelimiter => self.extract_enclosed(ring),
            },
        }

        let produced = self.frames.len() - before;
        if produced > 0 {
            trace!(produced, remaining = ring.len(), "extracted frames");
        }
        produced
    }

    /// [`extract`](Self::extract) followed by [`take_frames`](Self::take_frames).
    pub fn extract_frames(&mut self, ring: &mut RingBuffer) -> Vec<Frame> {
        self.extract(ring);
        self.take_frames()
    }

    /// Drain every pending frame, oldest first.
    pub fn take_frames(&mut self) -> Vec<Frame> {
        self.frames.drain(..).collect()
    }

    /// Pop the oldest pending frame.
    pub fn next_frame(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }

    /// Discard pending frames without returning them.
    pub fn clear_frames(&mut self) {
        self.frames.clear();
    }

    /// Number of frames waiting to be drained.
    pub fn pending(&self) -> usize {
        self.frames.len()
    }

    pub fn stats(&self) -> ExtractorStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = ExtractorStats::default();
    }

    /// Clear pending frames and counters and restart sequence numbering.
    pub fn reset(&mut self) {
        self.frames.clear();
        self.stats = ExtractorStats::default();
        self.next_sequence = 0;
    }

    /// Queue `payload` as the next frame, bypassing any ring.
    pub fn push_frame(&mut self, payload: impl Into<Bytes>) {
        let frame = Frame::new(self.next_sequence, payload);
        self.next_sequence += 1;
        self.stats.frames_extracted += 1;
        self.frames.push_back(frame);
    }

    fn drain_all(&mut self, ring: &mut RingBuffer) {
        let payload = ring.peek(ring.len());
        ring.skip(payload.len());
        if payload.is_empty() {
            self.stats.empty_frames += 1;
        } else {
            self.push_frame(payload);
        }
    }

    fn find_terminator(&self, ring: &RingBuffer) -> Option<Terminator> {
        if self.config.operation_mode != OperationMode::QuickPlot {
            return ring
                .find_pattern_with(&self.finish, 0)
                .map(|offset| Terminator {
                    offset,
                    len: self.finish.len(),
                });
        }

        // One pass for the earliest CR or LF; CR directly followed by LF is CRLF.
        let offset = ring.position(0, |b| b == b'\r' || b == b'\n')?;
        let len = match (ring.get(offset), ring.get(offset + 1)) {
            (Some(b'\r'), Some(b'\n')) => 2,
            _ => 1,
        };
        Some(Terminator { offset, len })
    }

    fn extract_end_delimited(&mut self, ring: &mut RingBuffer) {
        let cks = self.checksum_len;
        while let Some(end) = self.find_terminator(ring) {
            let crc_pos = end.offset + end.len;
            let frame_end = crc_pos + cks;

            if end.offset == 0 {
                if frame_end > ring.len() {
                    break;
                }
                self.drop_empty(ring, frame_end);
                continue;
            }

            let payload = ring.peek(end.offset);
            match self.validate(ring, &payload, crc_pos) {
                ValidationStatus::Ok => {
                    ring.skip(frame_end);
                    self.push_frame(payload);
                }
                ValidationStatus::Incomplete => break,
                ValidationStatus::ChecksumError => {
                    ring.skip(frame_end);
                    self.stats.bytes_discarded += frame_end as u64;
                }
            }
        }
    }

    fn extract_start_delimited(&mut self, ring: &mut RingBuffer) {
        let cks = self.checksum_len;
        let slen = self.start.len();
        while let Some(start) = ring.find_pattern_with(&self.start, 0) {
            let frame_start = start + slen;
            let frame_end = match ring.find_pattern_with(&self.start, frame_start) {
                Some(next) => next,
                None => {
                    if ring.len() - frame_start < cks.max(1) {
                        break;
                    }
                    ring.len()
                }
            };

            if frame_end == frame_start {
                self.drop_empty(ring, frame_end);
                continue;
            }
            if frame_end - frame_start < cks {
                self.drop_malformed(ring, frame_end);
                continue;
            }

            let crc_pos = frame_end - cks;
            if crc_pos == frame_start {
                self.drop_empty(ring, frame_end);
                continue;
            }

            let payload = ring.peek_at(frame_start, crc_pos - frame_start);
            match self.validate(ring, &payload, crc_pos) {
                ValidationStatus::Ok => {
                    ring.skip(frame_end);
                    self.stats.bytes_discarded += start as u64;
                    self.push_frame(payload);
                }
                // The tail sits before `frame_end`, so it is always buffered.
                ValidationStatus::Incomplete => break,
                ValidationStatus::ChecksumError => {
                    ring.skip(frame_end);
                    self.stats.bytes_discarded += frame_end as u64;
                }
            }
        }
    }

    fn extract_enclosed(&mut self, ring: &mut RingBuffer) {
        let cks = self.checksum_len;
        let slen = self.start.len();
        let flen = self.finish.len();
        while let Some(finish) = ring.find_pattern_with(&self.finish, 0) {
            let window = finish + slen.saturating_sub(1);
            let start = match ring.find_pattern_within(&self.start, 0, window) {
                Some(start) if start < finish => start,
                _ => {
                    self.drop_malformed(ring, finish + flen);
                    continue;
                }
            };

            let frame_start = start + slen;
            let crc_pos = finish + flen;
            let frame_end = crc_pos + cks;
            if frame_start >= finish {
                if frame_end > ring.len() {
                    break;
                }
                self.drop_empty(ring, frame_end);
                continue;
            }

            let payload = ring.peek_at(frame_start, finish - frame_start);
            match self.validate(ring, &payload, crc_pos) {
                ValidationStatus::Ok => {
                    ring.skip(frame_end);
                    self.stats.bytes_discarded += start as u64;
                    self.push_frame(payload);
                }
                ValidationStatus::Incomplete => break,
                ValidationStatus::ChecksumError => {
                    ring.skip(frame_end);
                    self.stats.bytes_discarded += frame_end as u64;
                }
            }
        }
    }

    /// Check `payload` against the tail stored at `crc_pos`.
    fn validate(&mut self, ring: &RingBuffer, payload: &[u8], crc_pos: usize) -> ValidationStatus {
        let cks = self.checksum_len;
        if cks == 0 {
            return ValidationStatus::Ok;
        }
        if ring.len() < crc_pos + cks {
            return ValidationStatus::Incomplete;
        }

        let received = ring.peek_at(crc_pos, cks);
        let calculated = self.registry.checksum(&self.algorithm, payload, None);
        if received == calculated {
            return ValidationStatus::Ok;
        }

        self.stats.checksum_errors += 1;
        warn!(
            algorithm = %self.algorithm,
            received = %hex(&received),
            calculated = %hex(&calculated),
            frame_len = payload.len(),
            "checksum mismatch; frame discarded"
        );
        ValidationStatus::ChecksumError
    }

    fn drop_empty(&mut self, ring: &mut RingBuffer, n: usize) {
        let skipped = ring.skip(n);
        self.stats.empty_frames += 1;
        self.stats.bytes_discarded += skipped as u64;
        trace!(skipped, "empty frame dropped");
    }

    fn drop_malformed(&mut self, ring: &mut RingBuffer, n: usize) {
        let skipped = ring.skip(n);
        self.stats.malformed_frames += 1;
        self.stats.bytes_discarded += skipped as u64;
        debug!(skipped, "malformed frame span discarded");
    }
}
