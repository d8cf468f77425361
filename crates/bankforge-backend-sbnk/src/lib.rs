//! bankforge SBNK Backend - Nitro Instrument Bank Encoding
//!
//! Encodes the canonical instrument model as an `SBNK` file, the instrument
//! bank format read by the Nintendo DS sound engine. Envelope and pan
//! registers are written as-is; waveform references point into a wave
//! archive built separately.
//!
//! # Example
//!
//! ```
//! use bankforge_backend_sbnk::SbnkEncoder;
//! use bankforge_model::{InstrumentBank, NativeBankEncoder};
//!
//! let bytes = SbnkEncoder::default().encode(&InstrumentBank::default()).unwrap();
//! assert_eq!(&bytes[0..4], b"SBNK");
//! ```

pub mod writer;

pub use writer::{
    InstrumentRecordType, SbnkEncoder, SbnkError, MAX_REGIONS, NOTE_DEFINITION_SIZE,
    SBNK_HEADER_SIZE,
};

/// Crate version for backend identification.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend identifier.
pub const BACKEND_ID: &str = "bankforge-backend-sbnk";
