//! In-process harness around the conversion pipeline.
//!
//! Runs `convert` the same way the CLI does, without spawning a process, and
//! hands back the report together with the failure, if any.

use std::fs;
use std::path::Path;

use bankforge_cli::commands::convert::{convert, ConvertFailure, ConvertOptions, ConvertReport};

use crate::format_validators::{validate_sbnk, validate_sf2, SbnkInfo, Sf2Info};

/// Result of one conversion run.
#[derive(Debug)]
pub struct ConvertRun {
    pub report: ConvertReport,
    pub outcome: Result<(), ConvertFailure>,
}

impl ConvertRun {
    /// Assert the conversion succeeded.
    pub fn assert_success(&self) -> &Self {
        if let Err(failure) = &self.outcome {
            panic!(
                "Expected conversion to succeed, got {}: {}",
                failure.error().code,
                failure.error().message
            );
        }
        self
    }

    /// Warning code strings in stage order.
    pub fn warning_codes(&self) -> Vec<&'static str> {
        self.report.warnings().map(|w| w.code.code()).collect()
    }

    /// Whether any warning carries the given code.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warning_codes().contains(&code)
    }
}

/// Run the conversion pipeline.
pub fn run_convert(options: &ConvertOptions) -> ConvertRun {
    let mut report = ConvertReport::default();
    let outcome = convert(options, &mut report);
    ConvertRun { report, outcome }
}

/// Read and validate an SF2 file.
pub fn validate_sf2_file(path: &Path) -> Sf2Info {
    let data = fs::read(path).expect("Failed to read SF2 output");
    validate_sf2(&data).unwrap_or_else(|e| panic!("Invalid SF2 {}: {}", path.display(), e))
}

/// Read and validate an SBNK file.
pub fn validate_sbnk_file(path: &Path) -> (Vec<u8>, SbnkInfo) {
    let data = fs::read(path).expect("Failed to read SBNK output");
    let info =
        validate_sbnk(&data).unwrap_or_else(|e| panic!("Invalid SBNK {}: {}", path.display(), e));
    (data, info)
}

/// BLAKE3 hash of a file's contents.
pub fn file_hash(path: &Path) -> String {
    let data = fs::read(path).expect("Failed to read file");
    blake3::hash(&data).to_hex().to_string()
}
