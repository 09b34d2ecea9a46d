use clap::{Args, Subcommand};
use std::path::PathBuf;

use streamframe_frame::{FrameDetection, OperationMode};
use streamframe_ring::DEFAULT_CAPACITY;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod algorithms;
pub mod checksum;
pub mod extract;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract frames from a file or stdin.
    Extract(ExtractArgs),
    /// Compute a checksum over a string or file.
    Checksum(ChecksumArgs),
    /// List supported checksum algorithms.
    Algorithms(AlgorithmsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Extract(args) => extract::run(args, format),
        Command::Checksum(args) => checksum::run(args, format),
        Command::Algorithms(args) => algorithms::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Framing options shared by commands that build an extractor.
#[derive(Args, Debug, Default)]
pub struct FramingArgs {
    /// JSON extractor configuration; flags below override its fields.
    #[arg(long, value_name = "FILE", env = "STREAMFRAME_CONFIG")]
    pub config: Option<PathBuf>,
    /// Operation mode (quick-plot, project-file, device-json).
    #[arg(long, value_name = "MODE")]
    pub mode: Option<OperationMode>,
    /// Frame detection in project-file mode.
    #[arg(long, value_name = "DETECTION")]
    pub detection: Option<FrameDetection>,
    /// Start sequence, escaped (e.g. "\x02", "/*").
    #[arg(long, value_name = "SEQ")]
    pub start: Option<String>,
    /// Finish sequence, escaped (e.g. "\r\n", "\x03").
    #[arg(long, value_name = "SEQ")]
    pub finish: Option<String>,
    /// Checksum algorithm name (project-file mode only).
    #[arg(long, value_name = "ALGORITHM")]
    pub checksum: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Input file. Reads stdin when omitted.
    pub file: Option<PathBuf>,
    #[command(flatten)]
    pub framing: FramingArgs,
    /// Bytes read from the input per chunk.
    #[arg(long, default_value = "4096")]
    pub chunk_size: usize,
    /// Ring buffer capacity in bytes.
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    pub capacity: usize,
    /// Run extraction on a dedicated worker thread.
    #[arg(long)]
    pub threaded: bool,
    /// Worker request timeout when --threaded is set (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
    /// Exit after printing N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ChecksumArgs {
    /// Algorithm name (e.g. crc16, CRC-32, fletcher16).
    pub algorithm: String,
    /// Input string.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read input from file.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
    /// Initial register value; defaults to the algorithm's standard seed.
    #[arg(long)]
    pub seed: Option<u32>,
}

#[derive(Args, Debug, Default)]
pub struct AlgorithmsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
