use std::fmt::Write as _;

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Crates whose events follow `--log-level`.
const STREAMFRAME_TARGETS: &[&str] = &[
    "streamframe",
    "streamframe_checksum",
    "streamframe_ring",
    "streamframe_frame",
    "streamframe_worker",
];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Filter directives for `level`: streamframe crates at `level`, everything
/// else at warn (or error when that is stricter).
pub fn directives(level: LogLevel) -> String {
    let fallback = if level == LogLevel::Error { "error" } else { "warn" };
    let mut out = String::from(fallback);
    for target in STREAMFRAME_TARGETS {
        let _ = write!(out, ",{target}={}", level.as_str());
    }
    out
}

/// `RUST_LOG` wins when set and valid; otherwise `--log-level` applies.
fn build_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level)))
}

/// Install the stderr subscriber. Frames go to stdout, diagnostics never do.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(build_filter(level))
        .with_ansi(false)
        .with_target(false);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_applies_to_own_crates_only() {
        let trace = directives(LogLevel::Trace);
        assert!(trace.starts_with("warn,"));
        assert!(trace.contains("streamframe_frame=trace"));
        assert!(trace.contains("streamframe_worker=trace"));
        assert!(!trace.contains("tokio"));
        assert!(EnvFilter::try_new(&trace).is_ok());
    }

    #[test]
    fn error_level_also_quiets_dependencies() {
        let error = directives(LogLevel::Error);
        assert!(error.starts_with("error,"));
        assert!(error.contains("streamframe=error"));
    }
}
