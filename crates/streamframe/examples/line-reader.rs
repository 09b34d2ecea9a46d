//! Quick-plot extraction from stdin: one frame per line.
//!
//! Run with:
//!   printf '1,2\r\n3,4\n' | cargo run --example line-reader

use std::io;

use streamframe::frame::{FrameExtractor, FrameReader};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let reader = FrameReader::new(io::stdin().lock(), FrameExtractor::default());

    for frame in reader {
        let frame = frame?;
        let values: Vec<&str> = std::str::from_utf8(&frame.payload)?.split(',').collect();
        println!("#{} {:?}", frame.sequence, values);
    }
    Ok(())
}
