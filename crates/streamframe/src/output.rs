use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use streamframe_frame::{hex, Frame};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    sequence: u64,
    timestamp_ms: u64,
    size: usize,
    encoding: &'a str,
    payload: String,
}

#[derive(Serialize)]
struct ChecksumOutput<'a> {
    algorithm: &'a str,
    length: usize,
    checksum: String,
}

#[derive(Serialize)]
pub struct AlgorithmRow {
    pub name: String,
    pub length: usize,
}

pub fn print_frame(frame: &Frame, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let (encoding, payload) = encode_payload(frame.payload.as_ref());
            let out = FrameOutput {
                sequence: frame.sequence,
                timestamp_ms: frame.timestamp_millis(),
                size: frame.payload.len(),
                encoding,
                payload,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SEQ", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    frame.sequence.to_string(),
                    frame.payload.len().to_string(),
                    payload_preview(frame.payload.as_ref()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "#{} size={} payload={}",
                frame.sequence,
                frame.payload.len(),
                payload_preview(frame.payload.as_ref())
            );
        }
        OutputFormat::Raw => {
            let mut line = frame.payload.to_vec();
            line.push(b'\n');
            print_raw(&line);
        }
    }
}

pub fn print_checksum(algorithm: &str, checksum: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ChecksumOutput {
                algorithm,
                length: checksum.len(),
                checksum: hex(checksum),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_header(vec!["ALGORITHM", "LENGTH", "CHECKSUM"])
                .add_row(vec![
                    algorithm.to_string(),
                    checksum.len().to_string(),
                    hex(checksum),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{algorithm}: {}", hex(checksum)),
        OutputFormat::Raw => print_raw(checksum),
    }
}

pub fn print_algorithms(rows: &[AlgorithmRow], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(rows).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL).set_header(vec!["NAME", "LENGTH"]);
            for row in rows {
                table.add_row(vec![row.name.clone(), row.length.to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for row in rows {
                println!("{} ({} bytes)", row.name, row.length);
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn encode_payload(payload: &[u8]) -> (&'static str, String) {
    match std::str::from_utf8(payload) {
        Ok(text) => ("utf8", text.to_string()),
        Err(_) => ("hex", hex(payload)),
    }
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes> {}", payload.len(), hex(payload)),
    }
}
