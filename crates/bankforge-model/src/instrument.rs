//! Canonical instrument model.
//!
//! An [`InstrumentBank`] is the immutable output of the model builder. Both the
//! native bank encoder and the SF2 assembler read it; neither mutates it.

use serde::Serialize;

use crate::envelope::{Envelope, MAX_REGISTER};

/// Default root key for notes and placeholders (middle C).
pub const DEFAULT_ROOT_KEY: u8 = 60;

/// How a note produces sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum NoteKind {
    /// Sampled waveform; the wave reference is a sample index.
    #[default]
    Pcm,
    /// PSG square wave; the wave reference is a duty cycle.
    SquareWave,
    /// PSG white noise.
    Noise,
}

impl NoteKind {
    /// Derive the kind from free text: "square"/"psg" select the square wave,
    /// "noise" selects noise, anything else is PCM.
    pub fn from_text(text: Option<&str>) -> Self {
        let text = text.unwrap_or("").to_ascii_lowercase();
        if text.contains("square") || text.contains("psg") {
            NoteKind::SquareWave
        } else if text.contains("noise") {
            NoteKind::Noise
        } else {
            NoteKind::Pcm
        }
    }
}

/// Per-row override of sample looping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LoopOverride {
    ForceOn,
    ForceOff,
    /// Follow the loop metadata of the sample.
    #[default]
    Auto,
}

impl LoopOverride {
    pub fn from_text(text: Option<&str>) -> Self {
        match text.map(|t| t.trim().to_ascii_lowercase()).as_deref() {
            Some("1" | "yes" | "true" | "loop" | "on") => LoopOverride::ForceOn,
            Some("0" | "no" | "false" | "off") => LoopOverride::ForceOff,
            _ => LoopOverride::Auto,
        }
    }

    /// Resolve against whether the sample declared a loop.
    pub fn resolve(self, sample_declares_loop: bool) -> bool {
        match self {
            LoopOverride::ForceOn => true,
            LoopOverride::ForceOff => false,
            LoopOverride::Auto => sample_declares_loop,
        }
    }
}

/// One playable note definition: envelope plus waveform binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Note {
    pub kind: NoteKind,
    /// Sample index for PCM notes, duty cycle for square waves, unused for noise.
    pub waveform: u16,
    pub root_key: u8,
    pub envelope: Envelope,
    pub loop_override: LoopOverride,
}

impl Default for Note {
    fn default() -> Self {
        Self {
            kind: NoteKind::Pcm,
            waveform: 0,
            root_key: DEFAULT_ROOT_KEY,
            envelope: Envelope::default(),
            loop_override: LoopOverride::Auto,
        }
    }
}

impl Note {
    /// Placeholder for keys no row covers: zero sustain at middle C.
    pub fn silent() -> Self {
        Self {
            envelope: Envelope::silent(),
            ..Self::default()
        }
    }

    /// Sample index for PCM notes.
    pub fn sample_ref(&self) -> Option<u16> {
        match self.kind {
            NoteKind::Pcm => Some(self.waveform),
            NoteKind::SquareWave | NoteKind::Noise => None,
        }
    }
}

/// Instrument archetype named in the `Type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Archetype {
    Null,
    Single,
    Regional,
    RangeKeyed,
}

impl Archetype {
    /// Parse a `Type` cell, ignoring case and surrounding whitespace.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "null" => Some(Archetype::Null),
            "simple" | "single" | "psg" | "pcm" => Some(Archetype::Single),
            "regional" => Some(Archetype::Regional),
            "range" => Some(Archetype::RangeKeyed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::Null => "null",
            Archetype::Single => "single",
            Archetype::Regional => "regional",
            Archetype::RangeKeyed => "range",
        }
    }
}

/// Single note spanning the whole keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SingleInstrument {
    pub name: Option<String>,
    pub note: Note,
}

/// A band of a regional instrument, ending at `key_max` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub key_max: u8,
    pub note: Note,
}

/// Keyboard split into ascending bands. The last band always ends at 127.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionalInstrument {
    pub name: Option<String>,
    pub regions: Vec<Region>,
}

impl RegionalInstrument {
    /// Inclusive key span of every band, derived from the previous band's end.
    ///
    /// Bands that repeat an earlier `key_max` cover no keys and yield `None`.
    pub fn key_spans(&self) -> impl Iterator<Item = (Option<(u8, u8)>, &Region)> {
        let mut next_low: u16 = 0;
        self.regions.iter().map(move |region| {
            let low = next_low;
            let high = region.key_max as u16;
            next_low = next_low.max(high + 1);
            let span = (low <= high).then_some((low as u8, high as u8));
            (span, region)
        })
    }
}

/// Per-key instrument (drum kit). `keys[i]` belongs to key `min_key + i`;
/// `None` marks a silent placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeInstrument {
    pub name: Option<String>,
    pub min_key: u8,
    pub keys: Vec<Option<Note>>,
}

impl RangeInstrument {
    pub fn max_key(&self) -> u8 {
        (self.min_key as usize + self.keys.len().saturating_sub(1)).min(MAX_REGISTER as usize) as u8
    }

    /// Note bound to a key, `None` outside the range or for placeholders.
    pub fn note_for_key(&self, key: u8) -> Option<&Note> {
        let index = (key as usize).checked_sub(self.min_key as usize)?;
        self.keys.get(index).and_then(Option::as_ref)
    }

    /// Every key of the range with its note or the silent placeholder.
    pub fn dense_notes(&self) -> impl Iterator<Item = (u8, Note)> + '_ {
        self.keys.iter().enumerate().map(move |(i, note)| {
            (
                self.min_key + i as u8,
                note.unwrap_or_else(Note::silent),
            )
        })
    }
}

/// An instrument slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum Instrument {
    /// Explicitly empty slot.
    #[default]
    Null,
    Single(SingleInstrument),
    Regional(RegionalInstrument),
    RangeKeyed(RangeInstrument),
}

impl Instrument {
    pub fn name(&self) -> Option<&str> {
        match self {
            Instrument::Null => None,
            Instrument::Single(i) => i.name.as_deref(),
            Instrument::Regional(i) => i.name.as_deref(),
            Instrument::RangeKeyed(i) => i.name.as_deref(),
        }
    }

    pub fn archetype(&self) -> Archetype {
        match self {
            Instrument::Null => Archetype::Null,
            Instrument::Single(_) => Archetype::Single,
            Instrument::Regional(_) => Archetype::Regional,
            Instrument::RangeKeyed(_) => Archetype::RangeKeyed,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Instrument::Null)
    }
}

/// Display name used when a row supplies none.
pub fn fallback_name(id: u16) -> String {
    format!("Inst{:03}", id)
}

/// All instruments of a bank, addressable by ID from 0 to the highest declared ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstrumentBank {
    instruments: Vec<Instrument>,
}

impl InstrumentBank {
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self { instruments }
    }

    /// Instrument in a slot; slots past the end read as `Null`.
    pub fn get(&self, id: u16) -> &Instrument {
        static NULL: Instrument = Instrument::Null;
        self.instruments.get(id as usize).unwrap_or(&NULL)
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    /// Iterate slots with their IDs.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Instrument)> {
        self.instruments
            .iter()
            .enumerate()
            .map(|(id, inst)| (id as u16, inst))
    }
}

/// Encoder for the hardware-oriented native bank format.
///
/// Consumes the canonical model read-only and returns the encoded bytes.
pub trait NativeBankEncoder {
    type Error: std::error::Error + Send + Sync + 'static;

    fn encode(&self, bank: &InstrumentBank) -> Result<Vec<u8>, Self::Error>;
}
