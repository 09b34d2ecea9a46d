use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FrameError, Result};

/// How the host is interpreting the device stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationMode {
    /// Line-oriented values; frames end at `\n`, `\r` or `\r\n`.
    #[default]
    QuickPlot,
    /// Framing fully described by the project configuration.
    ProjectFile,
    /// Device emits delimited structured reports.
    DeviceJson,
}

/// Boundary-detection policy used in [`OperationMode::ProjectFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameDetection {
    /// Everything buffered is one frame.
    NoDelimiters,
    /// Frames end with the finish sequence.
    #[default]
    EndDelimiter,
    /// Frames start with the start sequence and run to the next one.
    StartDelimiter,
    /// Frames are enclosed by the start and finish sequences.
    #[serde(alias = "start-end-delimiter")]
    StartAndEndDelimiter,
}

impl OperationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationMode::QuickPlot => "quick-plot",
            OperationMode::ProjectFile => "project-file",
            OperationMode::DeviceJson => "device-json",
        }
    }
}

impl FrameDetection {
    pub fn as_str(self) -> &'static str {
        match self {
            FrameDetection::NoDelimiters => "no-delimiters",
            FrameDetection::EndDelimiter => "end-delimiter",
            FrameDetection::StartDelimiter => "start-delimiter",
            FrameDetection::StartAndEndDelimiter => "start-and-end-delimiter",
        }
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for FrameDetection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "quick-plot" => Ok(OperationMode::QuickPlot),
            "project-file" => Ok(OperationMode::ProjectFile),
            "device-json" => Ok(OperationMode::DeviceJson),
            other => Err(format!(
                "unknown operation mode {other:?} (expected quick-plot, project-file or device-json)"
            )),
        }
    }
}

impl FromStr for FrameDetection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "no-delimiters" => Ok(FrameDetection::NoDelimiters),
            "end-delimiter" => Ok(FrameDetection::EndDelimiter),
            "start-delimiter" => Ok(FrameDetection::StartDelimiter),
            "start-and-end-delimiter" | "start-end-delimiter" => {
                Ok(FrameDetection::StartAndEndDelimiter)
            }
            other => Err(format!("unknown frame detection mode {other:?}")),
        }
    }
}

/// Complete extractor configuration.
///
/// Byte sequences serialize as escaped text (`"\r\n"`, `"\x02"`). Nothing
/// here is validated: an empty start sequence in start-delimiter mode simply
/// never matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    #[serde(alias = "operationMode")]
    pub operation_mode: OperationMode,
    #[serde(alias = "frameDetectionMode", alias = "frameDetection")]
    pub frame_detection: FrameDetection,
    #[serde(with = "sequence", alias = "startSequence")]
    pub start_sequence: Vec<u8>,
    #[serde(with = "sequence", alias = "finishSequence")]
    pub finish_sequence: Vec<u8>,
    #[serde(alias = "checksumAlgorithm")]
    pub checksum_algorithm: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self::quick_plot()
    }
}

impl ExtractorConfig {
    /// Line-oriented preset.
    pub fn quick_plot() -> Self {
        Self {
            operation_mode: OperationMode::QuickPlot,
            frame_detection: FrameDetection::EndDelimiter,
            start_sequence: Vec::new(),
            finish_sequence: b"\n".to_vec(),
            checksum_algorithm: String::new(),
        }
    }

    /// Structured-report preset: payloads enclosed in `/*` … `*/`.
    pub fn device_json() -> Self {
        Self {
            operation_mode: OperationMode::DeviceJson,
            frame_detection: FrameDetection::StartAndEndDelimiter,
            start_sequence: b"/*".to_vec(),
            finish_sequence: b"*/".to_vec(),
            checksum_algorithm: String::new(),
        }
    }

    /// Project-defined framing.
    pub fn project_file(
        frame_detection: FrameDetection,
        start_sequence: impl Into<Vec<u8>>,
        finish_sequence: impl Into<Vec<u8>>,
        checksum_algorithm: impl Into<String>,
    ) -> Self {
        Self {
            operation_mode: OperationMode::ProjectFile,
            frame_detection,
            start_sequence: start_sequence.into(),
            finish_sequence: finish_sequence.into(),
            checksum_algorithm: checksum_algorithm.into(),
        }
    }

    /// Parse a JSON document. Missing fields take their quick-plot defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Merge the fields present in `update`.
    pub fn apply(&mut self, update: &ConfigUpdate) {
        if let Some(mode) = update.operation_mode {
            self.operation_mode = mode;
        }
        if let Some(detection) = update.frame_detection {
            self.frame_detection = detection;
        }
        if let Some(start) = &update.start_sequence {
            self.start_sequence = start.clone();
        }
        if let Some(finish) = &update.finish_sequence {
            self.finish_sequence = finish.clone();
        }
        if let Some(checksum) = &update.checksum_algorithm {
            self.checksum_algorithm = checksum.clone();
        }
        self.clear_checksum_outside_project_mode();
    }

    /// Copy with the checksum cleared unless in project-file mode.
    pub fn normalized(mut self) -> Self {
        self.clear_checksum_outside_project_mode();
        self
    }

    fn clear_checksum_outside_project_mode(&mut self) {
        if self.operation_mode != OperationMode::ProjectFile {
            self.checksum_algorithm.clear();
        }
    }
}

/// Partial reconfiguration; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigUpdate {
    #[serde(alias = "operationMode", skip_serializing_if = "Option::is_none")]
    pub operation_mode: Option<OperationMode>,
    #[serde(
        alias = "frameDetectionMode",
        alias = "frameDetection",
        skip_serializing_if = "Option::is_none"
    )]
    pub frame_detection: Option<FrameDetection>,
    #[serde(
        with = "sequence::option",
        alias = "startSequence",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_sequence: Option<Vec<u8>>,
    #[serde(
        with = "sequence::option",
        alias = "finishSequence",
        skip_serializing_if = "Option::is_none"
    )]
    pub finish_sequence: Option<Vec<u8>>,
    #[serde(alias = "checksumAlgorithm", skip_serializing_if = "Option::is_none")]
    pub checksum_algorithm: Option<String>,
}

impl ConfigUpdate {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl From<ExtractorConfig> for ConfigUpdate {
    fn from(config: ExtractorConfig) -> Self {
        Self {
            operation_mode: Some(config.operation_mode),
            frame_detection: Some(config.frame_detection),
            start_sequence: Some(config.start_sequence),
            finish_sequence: Some(config.finish_sequence),
            checksum_algorithm: Some(config.checksum_algorithm),
        }
    }
}

/// Render bytes as escaped text: printable ASCII verbatim, `\n`, `\r`, `\t`,
/// `\0`, `\\`, and `\xNN` for everything else.
pub fn escape(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b'\0' => out.push_str("\\0"),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7E => out.push(b as char),
            _ => out.push_str(&format!("\\x{b:02X}")),
        }
    }
    out
}

/// Inverse of [`escape`]. Non-ASCII characters are taken as their UTF-8 bytes.
pub fn unescape(text: &str) -> Result<Vec<u8>> {
    let invalid = |reason: &str| FrameError::InvalidSequence {
        input: text.to_string(),
        reason: reason.to_string(),
    };

    let mut out = Vec::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut utf8 = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
            continue;
        }
        match chars.next() {
            Some('n') => out.push(b'\n'),
            Some('r') => out.push(b'\r'),
            Some('t') => out.push(b'\t'),
            Some('0') => out.push(0),
            Some('\\') => out.push(b'\\'),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                if hex.len() != 2 {
                    return Err(invalid("\\x needs two hex digits"));
                }
                let byte =
                    u8::from_str_radix(&hex, 16).map_err(|_| invalid("bad hex digits after \\x"))?;
                out.push(byte);
            }
            Some(other) => return Err(invalid(&format!("unknown escape \\{other}"))),
            None => return Err(invalid("dangling backslash")),
        }
    }
    Ok(out)
}

/// Serde adapter for byte sequences stored as escaped text.
pub mod sequence {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::escape(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::unescape(&text).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            bytes: &Option<Vec<u8>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match bytes {
                Some(bytes) => serializer.serialize_some(&super::super::escape(bytes)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Vec<u8>>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|text| super::super::unescape(&text).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
