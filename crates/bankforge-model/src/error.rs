//! Error and warning types for table loading and model building.

use serde::Serialize;
use thiserror::Error;

/// Fatal problems with the instrument table itself.
///
/// A schema error aborts the run before any output is written.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The table has no header row, no columns, or no data rows.
    #[error("instrument table is empty or unreadable")]
    Empty,

    /// A required column is absent from the header.
    #[error("missing required column '{0}' (check the header spelling)")]
    MissingColumn(&'static str),

    /// A quoted field was never closed.
    #[error("unterminated quoted field starting on line {0}")]
    UnterminatedQuote(usize),

    /// The input file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Warning codes reported while converting a bank.
///
/// Codes are stable so that JSON consumers can filter on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WarningCode {
    // Table loading (W1xx)
    /// W101: InstrumentID is not an integer
    InvalidInstrumentId,
    /// W102: Row was commented out
    CommentedRow,

    // Model building (W2xx)
    /// W201: Type column holds an unknown archetype
    UnknownArchetype,
    /// W202: KeyMin/KeyMax is not a valid key
    InvalidKeyBound,
    /// W203: No usable rows remain for the instrument
    NoUsableRows,
    /// W204: Last regional band did not reach key 127
    RegionExtended,
    /// W205: Extra rows on a single-note instrument
    ExtraRowsIgnored,
    /// W206: Range rows overwrote keys declared by an earlier row
    RangeOverlap,

    // Sample bank (W3xx)
    /// W301: Sample directory does not exist
    SampleSourceAbsent,
    /// W302: No file matches the waveform reference
    SampleNotFound,
    /// W303: Waveform file could not be loaded
    SampleUnreadable,
    /// W304: PSG notes have no sample to bind
    PsgNotRepresentable,
    /// W305: Regional band covers no keys
    EmptyKeyRange,
    /// W306: Instrument ended up without regions
    InstrumentDropped,
}

impl WarningCode {
    /// Returns the warning code string (e.g., "W101").
    pub fn code(&self) -> &'static str {
        match self {
            WarningCode::InvalidInstrumentId => "W101",
            WarningCode::CommentedRow => "W102",
            WarningCode::UnknownArchetype => "W201",
            WarningCode::InvalidKeyBound => "W202",
            WarningCode::NoUsableRows => "W203",
            WarningCode::RegionExtended => "W204",
            WarningCode::ExtraRowsIgnored => "W205",
            WarningCode::RangeOverlap => "W206",
            WarningCode::SampleSourceAbsent => "W301",
            WarningCode::SampleNotFound => "W302",
            WarningCode::SampleUnreadable => "W303",
            WarningCode::PsgNotRepresentable => "W304",
            WarningCode::EmptyKeyRange => "W305",
            WarningCode::InstrumentDropped => "W306",
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A non-fatal problem with a row, instrument or sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// The warning code.
    pub code: WarningCode,
    /// Human-readable message.
    pub message: String,
    /// Instrument slot the warning concerns.
    pub instrument: Option<u16>,
    /// Source line in the table (1-based, header is line 1).
    pub line: Option<usize>,
}

impl Warning {
    /// Creates a warning without location.
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            instrument: None,
            line: None,
        }
    }

    /// Creates a warning attached to an instrument slot.
    pub fn for_instrument(code: WarningCode, instrument: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            instrument: Some(instrument),
            line: None,
        }
    }

    /// Attaches a source line.
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        match (self.instrument, self.line) {
            (Some(id), Some(line)) => write!(f, " (instrument {}, line {})", id, line),
            (Some(id), None) => write!(f, " (instrument {})", id),
            (None, Some(line)) => write!(f, " (line {})", line),
            (None, None) => Ok(()),
        }
    }
}
