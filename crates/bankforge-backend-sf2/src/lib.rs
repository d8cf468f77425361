//! bankforge SF2 Backend - SoundFont 2 Bank Generation
//!
//! This crate turns the canonical instrument model into a SoundFont 2 bank:
//! samples are resolved from a directory of numbered WAV files, instruments
//! are mapped to key zones with converted envelopes, and the result is
//! serialized byte for byte.
//!
//! # Module Structure
//!
//! - [`envelope`]: register envelopes to timecents and centibels
//! - [`sample`]: WAV loading and `smpl` loop metadata
//! - [`library`]: waveform reference to sample file resolution and caching
//! - [`assemble`]: instrument model to SF2 bank mapping
//! - [`sf2`]: SF2 bank model and RIFF writer
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use bankforge_backend_sf2::{assemble_bank, AssembleOptions, SampleLibrary};
//! use bankforge_model::InstrumentBank;
//!
//! let bank = InstrumentBank::default();
//! let mut library = SampleLibrary::open(Path::new("samples"))?;
//! let result = assemble_bank(&bank, &mut library, &AssembleOptions::default());
//! result.bank.write_file(Path::new("bank.sf2"))?;
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod assemble;
pub mod envelope;
pub mod library;
pub mod sample;
pub mod sf2;

pub use assemble::{assemble_bank, AssembleOptions, AssembleResult, DEFAULT_BANK_NAME};
pub use envelope::{ms_to_timecents, pan_to_sf2, sustain_centibels, Sf2Envelope, RELEASE_STRETCH};
pub use library::{ResolveError, SampleLibrary};
pub use sample::{load_wave_sample, SampleError, WaveSample};
pub use sf2::{Sf2Bank, Sf2Instrument, Sf2Preset, Sf2Region};

/// Crate version for backend identification.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend identifier.
pub const BACKEND_ID: &str = "bankforge-backend-sf2";
