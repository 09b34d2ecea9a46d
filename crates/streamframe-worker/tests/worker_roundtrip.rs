//! Drives a worker thread the way an I/O layer would: configure once, then
//! stream chunks and collect frames.

use std::time::Duration;

use streamframe_checksum::checksum;
use streamframe_frame::{ConfigUpdate, FrameDetection, OperationMode};
use streamframe_worker::{FrameProcessor, Worker, WorkerConfig};

const TIMEOUT: Duration = Duration::from_secs(2);

#[test]
fn streamed_chunks_yield_ordered_checksummed_frames() {
    let mut worker = Worker::spawn(FrameProcessor::default()).unwrap();
    worker
        .configure(
            WorkerConfig {
                extractor: ConfigUpdate {
                    operation_mode: Some(OperationMode::ProjectFile),
                    frame_detection: Some(FrameDetection::StartAndEndDelimiter),
                    start_sequence: Some(vec![0x02]),
                    finish_sequence: Some(vec![0x03]),
                    checksum_algorithm: Some("crc32".to_string()),
                },
                buffer_capacity: Some(256),
            },
            TIMEOUT,
        )
        .unwrap();

    let mut wire = Vec::new();
    for i in 0..20u8 {
        let payload = format!("sample-{i}");
        wire.push(0x02);
        wire.extend_from_slice(payload.as_bytes());
        wire.push(0x03);
        wire.extend_from_slice(&checksum("crc32", payload.as_bytes()));
    }

    let chunks: Vec<Vec<u8>> = wire.chunks(7).map(<[u8]>::to_vec).collect();
    let frames = worker.process_batch(chunks, TIMEOUT).unwrap();

    assert_eq!(frames.len(), 20);
    for (i, frame) in frames.iter().enumerate() {
        assert_eq!(frame.sequence, i as u64);
        assert_eq!(frame.text(), format!("sample-{i}"));
    }

    let stats = worker.stats(TIMEOUT).unwrap();
    assert_eq!(stats.ring.capacity, 256);
    assert_eq!(stats.ring.size, 0);
    assert_eq!(stats.extractor.checksum_errors, 0);
    worker.shutdown().unwrap();
}

#[test]
fn dropping_the_handle_stops_the_thread() {
    let mut worker = Worker::spawn(FrameProcessor::default()).unwrap();
    worker.process(b"x\n".to_vec(), TIMEOUT).unwrap();
    drop(worker);
}
