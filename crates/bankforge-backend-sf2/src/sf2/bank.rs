//! In-memory SF2 bank, the output of the assembler and the input of the writer.

use std::rc::Rc;

use crate::envelope::Sf2Envelope;
use crate::sample::WaveSample;

/// One key zone of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sf2Region {
    pub key_lo: u8,
    pub key_hi: u8,
    pub root_key: u8,
    /// Index into [`Sf2Bank::samples`].
    pub sample_index: u16,
    pub envelope: Sf2Envelope,
    pub looped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sf2Instrument {
    pub name: String,
    pub regions: Vec<Sf2Region>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sf2Preset {
    pub name: String,
    pub program: u16,
    pub bank: u16,
    /// Index into [`Sf2Bank::instruments`].
    pub instrument: u16,
}

impl Sf2Preset {
    /// Preset for an instrument slot: program `id % 128`, bank `id / 128`.
    pub fn for_slot(id: u16, name: &str, instrument: u16) -> Self {
        Self {
            name: name.to_string(),
            program: id % 128,
            bank: id / 128,
            instrument,
        }
    }
}

/// A complete SoundFont bank ready for serialization.
#[derive(Debug, Clone, Default)]
pub struct Sf2Bank {
    pub name: String,
    /// Samples in emission order.
    pub samples: Vec<Rc<WaveSample>>,
    pub instruments: Vec<Sf2Instrument>,
    pub presets: Vec<Sf2Preset>,
}

impl Sf2Bank {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Total regions over all instruments.
    pub fn region_count(&self) -> usize {
        self.instruments.iter().map(|i| i.regions.len()).sum()
    }

    /// Total PCM frames over all samples, without the silence pad.
    pub fn sample_frames(&self) -> u64 {
        self.samples.iter().map(|s| s.pcm.len() as u64).sum()
    }
}
