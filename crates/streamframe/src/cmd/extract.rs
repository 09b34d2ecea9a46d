use std::fs::{self, File};
use std::io::{self, ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use streamframe_frame::{unescape, ConfigUpdate, ExtractorConfig, FrameExtractor, FrameReader};
use streamframe_ring::RingBuffer;
use streamframe_worker::{FrameProcessor, Worker};
use tracing::{debug, info};

use crate::cmd::{ExtractArgs, FramingArgs};
use crate::exit::{
    frame_error, io_error, worker_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE,
};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: ExtractArgs, format: OutputFormat) -> CliResult<i32> {
    if args.capacity == 0 {
        return Err(CliError::new(USAGE, "--capacity must be greater than zero"));
    }
    if args.chunk_size == 0 {
        return Err(CliError::new(USAGE, "--chunk-size must be greater than zero"));
    }

    let config = resolve_config(&args.framing)?;
    debug!(?config, "resolved extractor config");

    let input = open_input(&args)?;
    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let printer = FramePrinter {
        format,
        limit: args.count,
        printed: 0,
    };
    if args.threaded {
        run_threaded(&args, config, input, running, printer)
    } else {
        run_inline(&args, config, input, running, printer)
    }
}

/// Build the extractor config: `--config` file first, then flag overrides.
pub fn resolve_config(args: &FramingArgs) -> CliResult<ExtractorConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
            ExtractorConfig::from_json(&text)
                .map_err(|err| frame_error(&format!("invalid config {}", path.display()), err))?
        }
        None => ExtractorConfig::default(),
    };

    let sequence = |flag: &str, value: &Option<String>| -> CliResult<Option<Vec<u8>>> {
        value
            .as_deref()
            .map(|text| unescape(text).map_err(|err| frame_error(flag, err)))
            .transpose()
    };

    config.apply(&ConfigUpdate {
        operation_mode: args.mode,
        frame_detection: args.detection,
        start_sequence: sequence("--start", &args.start)?,
        finish_sequence: sequence("--finish", &args.finish)?,
        checksum_algorithm: args.checksum.clone(),
    });
    Ok(config)
}

struct FramePrinter {
    format: OutputFormat,
    limit: Option<usize>,
    printed: usize,
}

impl FramePrinter {
    /// Print `frame`; returns false once the `--count` limit is reached.
    fn print(&mut self, frame: &streamframe_frame::Frame) -> bool {
        print_frame(frame, self.format);
        self.printed = self.printed.saturating_add(1);
        self.limit.is_none_or(|limit| self.printed < limit)
    }

    fn done(&self) -> bool {
        self.limit.is_some_and(|limit| self.printed >= limit)
    }
}

fn run_inline(
    args: &ExtractArgs,
    config: ExtractorConfig,
    input: Box<dyn Read>,
    running: Arc<AtomicBool>,
    mut printer: FramePrinter,
) -> CliResult<i32> {
    let mut reader = FrameReader::with_ring(
        input,
        FrameExtractor::new(config),
        RingBuffer::with_capacity(args.capacity),
    );
    reader.set_chunk_size(args.chunk_size);

    while running.load(Ordering::SeqCst) && !printer.done() {
        match reader.read_frame() {
            Ok(Some(frame)) => {
                if !printer.print(&frame) {
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => return Err(frame_error("read failed", err)),
        }
    }

    let stats = reader.extractor().stats();
    info!(
        frames = stats.frames_extracted,
        printed = printer.printed,
        checksum_errors = stats.checksum_errors,
        empty_frames = stats.empty_frames,
        malformed_frames = stats.malformed_frames,
        bytes_discarded = stats.bytes_discarded,
        bytes_read = reader.bytes_read(),
        unterminated = reader.buffered(),
        "extraction finished"
    );
    Ok(SUCCESS)
}

fn run_threaded(
    args: &ExtractArgs,
    config: ExtractorConfig,
    mut input: Box<dyn Read>,
    running: Arc<AtomicBool>,
    mut printer: FramePrinter,
) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let processor = FrameProcessor::with_parts(
        FrameExtractor::new(config),
        RingBuffer::with_capacity(args.capacity),
    );
    let mut worker =
        Worker::spawn(processor).map_err(|err| worker_error("worker start failed", err))?;

    let mut chunk = vec![0u8; args.chunk_size];
    'read: while running.load(Ordering::SeqCst) {
        let read = match input.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(io_error("read failed", err)),
        };

        let frames = worker
            .process(chunk[..read].to_vec(), timeout)
            .map_err(|err| worker_error("process failed", err))?;
        for frame in &frames {
            if !printer.print(frame) {
                break 'read;
            }
        }
    }

    let stats = worker
        .stats(timeout)
        .map_err(|err| worker_error("stats failed", err))?;
    info!(
        frames = stats.extractor.frames_extracted,
        printed = printer.printed,
        checksum_errors = stats.extractor.checksum_errors,
        empty_frames = stats.extractor.empty_frames,
        malformed_frames = stats.extractor.malformed_frames,
        bytes_discarded = stats.extractor.bytes_discarded,
        bytes_read = stats.bytes_processed,
        unterminated = stats.ring.size,
        "extraction finished"
    );
    worker
        .shutdown()
        .map_err(|err| worker_error("worker shutdown failed", err))?;
    Ok(SUCCESS)
}

fn open_input(args: &ExtractArgs) -> CliResult<Box<dyn Read>> {
    match &args.file {
        Some(path) => {
            let file = File::open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdin())),
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use streamframe_frame::{FrameDetection, OperationMode};

    use super::*;

    #[test]
    fn flags_override_config_file() {
        let path = std::env::temp_dir().join(format!(
            "streamframe-config-{}.json",
            std::process::id()
        ));
        let mut file = File::create(&path).unwrap();
        file.write_all(
            br#"{"operation_mode":"project-file","frame_detection":"end-delimiter","finish_sequence":";","checksum_algorithm":"crc8"}"#,
        )
        .unwrap();

        let config = resolve_config(&FramingArgs {
            config: Some(path.clone()),
            finish: Some("\\r\\n".to_string()),
            ..FramingArgs::default()
        })
        .unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(config.operation_mode, OperationMode::ProjectFile);
        assert_eq!(config.frame_detection, FrameDetection::EndDelimiter);
        assert_eq!(config.finish_sequence, b"\r\n");
        assert_eq!(config.checksum_algorithm, "crc8");
    }

    #[test]
    fn bad_escape_is_usage_error() {
        let err = resolve_config(&FramingArgs {
            start: Some("\\q".to_string()),
            ..FramingArgs::default()
        })
        .unwrap_err();
        assert_eq!(err.code, USAGE);
        assert!(err.message.starts_with("--start"));
    }

    #[test]
    fn parses_durations() {
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("3s").unwrap(), Duration::from_secs(3));
        assert_eq!(parse_duration("7").unwrap(), Duration::from_secs(7));
        assert_eq!(parse_duration("0s").unwrap_err().code, USAGE);
        assert_eq!(parse_duration("fast").unwrap_err().code, USAGE);
    }

    #[test]
    fn printer_stops_at_limit() {
        let mut printer = FramePrinter {
            format: OutputFormat::Pretty,
            limit: Some(2),
            printed: 0,
        };
        let frame = streamframe_frame::Frame::new(0, &b"x"[..]);
        assert!(printer.print(&frame));
        assert!(!printer.done());
        assert!(!printer.print(&frame));
        assert!(printer.done());
    }
}
