//! Project-file framing on a worker thread, with a checksum tail.
//!
//! Run with:
//!   cargo run --example threaded-project

use std::time::Duration;

use streamframe::checksum::checksum;
use streamframe::frame::{ExtractorConfig, FrameDetection};
use streamframe::worker::{FrameProcessor, Worker};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ExtractorConfig::project_file(
        FrameDetection::StartAndEndDelimiter,
        b"$".to_vec(),
        b";".to_vec(),
        "crc8",
    );
    let mut worker = Worker::spawn(FrameProcessor::new(config))?;

    let mut wire = Vec::new();
    for (i, reading) in ["21.5,40", "21.6,41", "21.4,39"].iter().enumerate() {
        wire.push(b'$');
        wire.extend_from_slice(reading.as_bytes());
        wire.push(b';');
        let mut tail = checksum("crc8", reading.as_bytes());
        if i == 1 {
            // Corrupt the second frame's tail.
            tail[0] ^= 0xFF;
        }
        wire.extend_from_slice(&tail);
    }

    let timeout = Duration::from_secs(1);
    for chunk in wire.chunks(5) {
        for frame in worker.process(chunk.to_vec(), timeout)? {
            println!("#{} {}", frame.sequence, frame.text());
        }
    }

    let stats = worker.stats(timeout)?;
    eprintln!(
        "frames={} checksum_errors={}",
        stats.extractor.frames_extracted, stats.extractor.checksum_errors
    );
    worker.shutdown()?;
    Ok(())
}
