//! Decode device-json frames from an async byte stream.
//!
//! Run with:
//!   cargo run --example async-device-json --features async

use futures_util::StreamExt;
use streamframe::frame::{ExtractorCodec, ExtractorConfig, FrameExtractor};
use tokio::io::AsyncWriteExt;
use tokio_util::codec::FramedRead;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (mut device, host) = tokio::io::duplex(32);

    tokio::spawn(async move {
        let reports: &[&[u8]] = &[b"/*{\"temp\":", b"21.5}*/noise", b"/*{\"temp\":21.7}*/"];
        for report in reports {
            if device.write_all(report).await.is_err() {
                return;
            }
        }
    });

    let codec = ExtractorCodec::new(FrameExtractor::new(ExtractorConfig::device_json()));
    let mut frames = FramedRead::new(host, codec);
    while let Some(frame) = frames.next().await {
        let frame = frame?;
        println!("#{} {}", frame.sequence, frame.text());
    }
    Ok(())
}
