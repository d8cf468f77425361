//! bankforge End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the conversion flow:
//!
//! - Conversion: instrument table + sample directory -> SBNK and SF2 files
//! - Validation: independent structural parsers for both output formats
//! - Determinism: byte-identical output across runs
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p bankforge-tests
//! ```

pub mod fixtures;
pub mod format_validators;
pub mod harness;

// Re-export commonly used items
pub use fixtures::{ramp, wav_bytes, BankFixture};
pub use harness::{run_convert, validate_sbnk_file, validate_sf2_file, ConvertRun};
