//! SoundFont 2 container: bank model, chunk primitives, record tables and writer.

pub mod bank;
pub mod chunk;
pub mod pdta;
pub mod writer;

pub use bank::{Sf2Bank, Sf2Instrument, Sf2Preset, Sf2Region};
pub use pdta::{GenRecord, GENERATORS_PER_REGION, SILENCE_PAD_FRAMES};
pub use writer::{SF2_VERSION, SOUND_ENGINE};
