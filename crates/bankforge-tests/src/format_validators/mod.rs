//! Binary format validators for test infrastructure.
//!
//! These parsers are written independently of the writers under test: they
//! walk the produced bytes and return structured information, failing on any
//! structural inconsistency.

use std::fmt;

mod sbnk;
mod sf2;

// Re-export public types and functions
pub use sbnk::{validate_sbnk, SbnkInfo, SbnkRecord};
pub use sf2::{
    validate_sf2, Sf2Generator, Sf2Info, Sf2InstHeader, Sf2PresetHeader, Sf2SampleHeader,
};

/// Error type for format validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    /// The format being validated.
    pub format: &'static str,
    /// Description of what went wrong.
    pub message: String,
    /// Byte offset where the error occurred, if applicable.
    pub offset: Option<usize>,
}

impl FormatError {
    /// Create a new format error.
    pub fn new(format: &'static str, message: impl Into<String>) -> Self {
        Self {
            format,
            message: message.into(),
            offset: None,
        }
    }

    /// Create a format error with a byte offset.
    pub fn at_offset(format: &'static str, message: impl Into<String>, offset: usize) -> Self {
        Self {
            format,
            message: message.into(),
            offset: Some(offset),
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(offset) = self.offset {
            write!(
                f,
                "{} error at offset {}: {}",
                self.format, offset, self.message
            )
        } else {
            write!(f, "{} error: {}", self.format, self.message)
        }
    }
}

impl std::error::Error for FormatError {}

/// Extract a null-terminated string from a byte slice.
pub(crate) fn extract_string(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).to_string()
}

pub(crate) fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

pub(crate) fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_display() {
        let err = FormatError::new("TEST", "something went wrong");
        assert_eq!(format!("{}", err), "TEST error: something went wrong");

        let err_offset = FormatError::at_offset("SF2", "bad header", 12);
        assert_eq!(
            format!("{}", err_offset),
            "SF2 error at offset 12: bad header"
        );
    }

    #[test]
    fn test_extract_string_null_terminated() {
        let data = b"Hello\0World";
        assert_eq!(extract_string(data), "Hello");
    }

    #[test]
    fn test_extract_string_no_terminator() {
        let data = b"Hello";
        assert_eq!(extract_string(data), "Hello");
    }
}
