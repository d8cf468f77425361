//! bankforge Instrument Model Library
//!
//! This crate turns a loosely typed instrument table (CSV rows keyed by
//! instrument ID) into the canonical, archetype-polymorphic instrument model
//! shared by every bank backend.
//!
//! # Overview
//!
//! - **Table reading**: spreadsheet-friendly CSV parsing ([`table`])
//! - **Loading**: schema checks and grouping rows by instrument ([`loader`])
//! - **Building**: key-range partitioning, gap filling and conflict resolution
//!   for single, regional and range instruments ([`builder`])
//! - **Envelopes**: register values and their time/level domain ([`envelope`])
//!
//! # Example
//!
//! ```
//! use bankforge_model::{build_bank, read_table, Instrument, InstrumentTable};
//!
//! let table = read_table("InstrumentID,Type,WaveID\n0,simple,0\n").unwrap();
//! let loaded = InstrumentTable::from_table(table).unwrap();
//! let built = build_bank(&loaded.table);
//!
//! assert!(matches!(built.bank.get(0), Instrument::Single(_)));
//! ```

pub mod builder;
pub mod envelope;
pub mod error;
pub mod fields;
pub mod instrument;
pub mod loader;
pub mod table;

pub use builder::{build_bank, build_instrument, note_from_row, BuildResult};
pub use envelope::{
    attack_ms, clamp_register, decay_time_ms, release_time_ms, sustain_fraction, Envelope,
    ATTACK_TIME_MS, MAX_DECAY_RELEASE_MS, MAX_REGISTER, PAN_CENTER,
};
pub use error::{SchemaError, Warning, WarningCode};
pub use fields::{parse_int_or_default, FieldDefaults, FIELD_DEFAULTS};
pub use instrument::{
    fallback_name, Archetype, Instrument, InstrumentBank, LoopOverride, NativeBankEncoder, Note,
    NoteKind, RangeInstrument, Region, RegionalInstrument, SingleInstrument, DEFAULT_ROOT_KEY,
};
pub use loader::{InstrumentTable, LoadResult};
pub use table::{read_table, read_table_file, Row, Table};
