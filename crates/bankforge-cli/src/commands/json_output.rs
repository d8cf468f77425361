//! JSON output types for machine-readable CLI output.
//!
//! These types back the `--json` flag of `convert` and `envelope`.

use bankforge_model::Warning;
use serde::{Deserialize, Serialize};

/// Error codes for CLI operations.
///
/// These codes are stable and can be used for programmatic error handling.
pub mod error_codes {
    /// Instrument table could not be read or lacks required columns
    pub const TABLE_SCHEMA: &str = "CLI_001";
    /// Native bank encoding failed
    pub const SBNK_ENCODE: &str = "CLI_002";
    /// Native bank file could not be written
    pub const SBNK_WRITE: &str = "CLI_003";
    /// SF2 file could not be written
    pub const SF2_WRITE: &str = "CLI_004";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "CLI_001")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// File the error concerns (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl JsonError {
    /// Creates a new error with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            file: None,
        }
    }

    /// Sets the file path for this error.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// A structured warning in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonWarning {
    /// Stable warning code (e.g., "W202")
    pub code: String,
    /// Human-readable warning message
    pub message: String,
    /// Instrument slot (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument: Option<u16>,
    /// Table line (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl From<&Warning> for JsonWarning {
    fn from(warning: &Warning) -> Self {
        Self {
            code: warning.code.code().to_string(),
            message: warning.message.clone(),
            instrument: warning.instrument,
            line: warning.line,
        }
    }
}

/// A file written by the command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputFile {
    pub path: String,
    /// BLAKE3 hash of the file contents
    pub hash: String,
    pub size: u64,
}

/// Conversion result details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertResult {
    /// Instrument slots, including null slots
    pub slots: usize,
    /// Non-null instruments
    pub instruments: usize,
    pub sbnk: Option<OutputFile>,
    /// SF2 output, absent when the stage was skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sf2: Option<OutputFile>,
    /// Presets written to the SF2 bank
    pub sf2_presets: usize,
    /// Samples embedded in the SF2 bank
    pub sf2_samples: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// JSON output for the `convert` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertOutput {
    /// Whether conversion succeeded
    pub success: bool,
    pub errors: Vec<JsonError>,
    pub warnings: Vec<JsonWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ConvertResult>,
}

impl ConvertOutput {
    /// Creates a successful convert output.
    pub fn success(result: ConvertResult, warnings: Vec<JsonWarning>) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            warnings,
            result: Some(result),
        }
    }

    /// Creates a failed convert output.
    pub fn failure(errors: Vec<JsonError>, warnings: Vec<JsonWarning>) -> Self {
        Self {
            success: false,
            errors,
            warnings,
            result: None,
        }
    }
}

/// Time/level domain of one register set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvelopeDomain {
    pub attack_ms: f64,
    pub decay_ms: f64,
    pub sustain_fraction: f64,
    pub release_ms: f64,
}

/// SF2 generator amounts of one register set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnvelopeGenerators {
    pub pan: i16,
    pub attack_timecents: i16,
    pub decay_timecents: i16,
    pub sustain_centibels: i16,
    pub release_timecents: i16,
}

/// JSON output for the `envelope` command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvelopeOutput {
    pub registers: [u8; 5],
    pub domain: EnvelopeDomain,
    pub sf2: EnvelopeGenerators,
}
