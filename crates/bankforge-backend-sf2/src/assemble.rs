//! Bank assembly: canonical instrument model to SF2 bank.
//!
//! Every non-null instrument becomes an SF2 instrument with one region per
//! key zone, plus a preset pointing at it. Regions that cannot be bound to a
//! sample are dropped with a warning; the rest of the instrument survives.

use std::collections::BTreeSet;

use bankforge_model::{
    fallback_name, Instrument, InstrumentBank, Note, Warning, WarningCode, MAX_REGISTER,
};

use crate::envelope::Sf2Envelope;
use crate::library::{ResolveError, SampleLibrary};
use crate::sf2::{Sf2Bank, Sf2Instrument, Sf2Preset, Sf2Region};

/// Default name written to the `INAM` chunk.
pub const DEFAULT_BANK_NAME: &str = "bankforge";

#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Bank name stored in the INFO list.
    pub bank_name: String,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            bank_name: DEFAULT_BANK_NAME.to_string(),
        }
    }
}

/// Result of bank assembly.
#[derive(Debug)]
pub struct AssembleResult {
    pub bank: Sf2Bank,
    pub warnings: Vec<Warning>,
}

/// Assemble an SF2 bank, loading samples from the library on demand.
pub fn assemble_bank(
    bank: &InstrumentBank,
    library: &mut SampleLibrary,
    options: &AssembleOptions,
) -> AssembleResult {
    let mut sf2 = Sf2Bank::new(&options.bank_name);
    let mut warnings = Vec::new();

    for (id, instrument) in bank.iter() {
        if instrument.is_null() {
            continue;
        }
        let name = instrument
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| fallback_name(id));

        let mut zones = ZoneCollector::new(id, library, &mut warnings);
        match instrument {
            Instrument::Null => {}
            Instrument::Single(single) => zones.push(0, MAX_REGISTER, &single.note),
            Instrument::Regional(regional) => {
                for (index, (span, region)) in regional.key_spans().enumerate() {
                    match span {
                        Some((lo, hi)) => zones.push(lo, hi, &region.note),
                        None => zones.warnings.push(Warning::for_instrument(
                            WarningCode::EmptyKeyRange,
                            id,
                            format!(
                                "band {} (KeyMax {}) covers no keys; skipped",
                                index, region.key_max
                            ),
                        )),
                    }
                }
            }
            Instrument::RangeKeyed(range) => {
                for (offset, note) in range.keys.iter().enumerate() {
                    // Placeholders stay silent in the SF2 bank.
                    if let Some(note) = note {
                        let key = range.min_key + offset as u8;
                        zones.push(key, key, note);
                    }
                }
            }
        }
        let regions = zones.finish();

        if regions.is_empty() {
            warnings.push(Warning::for_instrument(
                WarningCode::InstrumentDropped,
                id,
                format!("'{}' has no playable regions; no preset written", name),
            ));
            continue;
        }

        let index = sf2.instruments.len() as u16;
        sf2.presets.push(Sf2Preset::for_slot(id, &name, index));
        sf2.instruments.push(Sf2Instrument { name, regions });
    }

    sf2.samples = library.samples().to_vec();
    AssembleResult {
        bank: sf2,
        warnings,
    }
}

/// Collects the regions of one instrument and the warnings they raise.
struct ZoneCollector<'a> {
    id: u16,
    library: &'a mut SampleLibrary,
    warnings: &'a mut Vec<Warning>,
    regions: Vec<Sf2Region>,
    psg_skipped: usize,
    /// Waveforms already reported for this instrument.
    reported: BTreeSet<u16>,
}

impl<'a> ZoneCollector<'a> {
    fn new(id: u16, library: &'a mut SampleLibrary, warnings: &'a mut Vec<Warning>) -> Self {
        Self {
            id,
            library,
            warnings,
            regions: Vec::new(),
            psg_skipped: 0,
            reported: BTreeSet::new(),
        }
    }

    fn push(&mut self, key_lo: u8, key_hi: u8, note: &Note) {
        let Some(waveform) = note.sample_ref() else {
            self.psg_skipped += 1;
            return;
        };

        match self.library.resolve(waveform) {
            Ok((sample_index, sample)) => self.regions.push(Sf2Region {
                key_lo,
                key_hi,
                root_key: note.root_key,
                sample_index,
                envelope: Sf2Envelope::from_envelope(&note.envelope),
                looped: note.loop_override.resolve(sample.loop_declared),
            }),
            Err(err) => {
                if !self.reported.insert(waveform) {
                    return;
                }
                let code = match err {
                    ResolveError::NotFound(_) => WarningCode::SampleNotFound,
                    ResolveError::Unreadable(_) => WarningCode::SampleUnreadable,
                };
                self.warnings.push(Warning::for_instrument(
                    code,
                    self.id,
                    format!("waveform {}: {}; region skipped", waveform, err),
                ));
            }
        }
    }

    fn finish(self) -> Vec<Sf2Region> {
        if self.psg_skipped > 0 {
            self.warnings.push(Warning::for_instrument(
                WarningCode::PsgNotRepresentable,
                self.id,
                format!(
                    "{} PSG region(s) have no sample and were skipped",
                    self.psg_skipped
                ),
            ));
        }
        self.regions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankforge_model::{
        Envelope, LoopOverride, NoteKind, RangeInstrument, Region, RegionalInstrument,
        SingleInstrument,
    };
    use std::path::Path;

    fn write_wav(path: &Path, frames: usize) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            writer.write_sample((i as i16).wrapping_mul(64)).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn pcm(waveform: u16) -> Note {
        Note {
            waveform,
            ..Note::default()
        }
    }

    fn library_with(files: &[(&str, usize)]) -> (tempfile::TempDir, SampleLibrary) {
        let dir = tempfile::tempdir().unwrap();
        for (name, frames) in files {
            write_wav(&dir.path().join(name), *frames);
        }
        let library = SampleLibrary::open(dir.path()).unwrap();
        (dir, library)
    }

    fn codes(warnings: &[Warning]) -> Vec<WarningCode> {
        warnings.iter().map(|w| w.code).collect()
    }

    #[test]
    fn test_single_spans_keyboard() {
        let (_dir, mut library) = library_with(&[("00_sine.wav", 32)]);
        let bank = InstrumentBank::new(vec![Instrument::Single(SingleInstrument {
            name: None,
            note: pcm(0),
        })]);

        let result = assemble_bank(&bank, &mut library, &AssembleOptions::default());
        assert!(result.warnings.is_empty());
        assert_eq!(result.bank.samples.len(), 1);
        assert_eq!(result.bank.instruments[0].name, "Inst000");
        let region = result.bank.instruments[0].regions[0];
        assert_eq!((region.key_lo, region.key_hi), (0, 127));
        assert!(!region.looped);
        assert_eq!(result.bank.presets[0].name, "Inst000");
    }

    #[test]
    fn test_regional_bands_are_contiguous() {
        let (_dir, mut library) = library_with(&[("00_a.wav", 8), ("01_b.wav", 8)]);
        let regional = RegionalInstrument {
            name: Some("Split".to_string()),
            regions: vec![
                Region { key_max: 59, note: pcm(0) },
                Region { key_max: 59, note: pcm(1) },
                Region { key_max: 127, note: pcm(1) },
            ],
        };
        let bank = InstrumentBank::new(vec![Instrument::Regional(regional)]);

        let result = assemble_bank(&bank, &mut library, &AssembleOptions::default());
        let spans: Vec<_> = result.bank.instruments[0]
            .regions
            .iter()
            .map(|r| (r.key_lo, r.key_hi, r.sample_index))
            .collect();
        assert_eq!(spans, vec![(0, 59, 0), (60, 127, 1)]);
        assert_eq!(codes(&result.warnings), vec![WarningCode::EmptyKeyRange]);
    }

    #[test]
    fn test_range_placeholders_emit_nothing() {
        let (_dir, mut library) = library_with(&[("03_kick.wav", 8)]);
        let range = RangeInstrument {
            name: Some("Kit".to_string()),
            min_key: 36,
            keys: vec![Some(pcm(3)), None, Some(pcm(3))],
        };
        let bank = InstrumentBank::new(vec![Instrument::Null, Instrument::RangeKeyed(range)]);

        let result = assemble_bank(&bank, &mut library, &AssembleOptions::default());
        let keys: Vec<_> = result.bank.instruments[0]
            .regions
            .iter()
            .map(|r| (r.key_lo, r.key_hi))
            .collect();
        assert_eq!(keys, vec![(36, 36), (38, 38)]);
        // Loaded once, shared by both regions.
        assert_eq!(result.bank.samples.len(), 1);
        assert_eq!(result.bank.presets[0].program, 1);
    }

    #[test]
    fn test_missing_sample_skips_region_only() {
        let (_dir, mut library) = library_with(&[("00_a.wav", 8)]);
        let regional = RegionalInstrument {
            name: None,
            regions: vec![
                Region { key_max: 40, note: pcm(9) },
                Region { key_max: 80, note: pcm(9) },
                Region { key_max: 127, note: pcm(0) },
            ],
        };
        let bank = InstrumentBank::new(vec![Instrument::Regional(regional)]);

        let result = assemble_bank(&bank, &mut library, &AssembleOptions::default());
        assert_eq!(result.bank.instruments[0].regions.len(), 1);
        assert_eq!(result.bank.instruments[0].regions[0].key_lo, 81);
        assert_eq!(codes(&result.warnings), vec![WarningCode::SampleNotFound]);
    }

    #[test]
    fn test_psg_only_instrument_is_dropped() {
        let (_dir, mut library) = library_with(&[]);
        let note = Note {
            kind: NoteKind::SquareWave,
            waveform: 3,
            ..Note::default()
        };
        assert_eq!(note.sample_ref(), None);
        let bank = InstrumentBank::new(vec![Instrument::Single(SingleInstrument {
            name: Some("Lead".to_string()),
            note,
        })]);

        let result = assemble_bank(&bank, &mut library, &AssembleOptions::default());
        assert!(result.bank.instruments.is_empty());
        assert!(result.bank.presets.is_empty());
        assert_eq!(
            codes(&result.warnings),
            vec![WarningCode::PsgNotRepresentable, WarningCode::InstrumentDropped]
        );
    }

    #[test]
    fn test_loop_override_wins() {
        let (_dir, mut library) = library_with(&[("00_a.wav", 8)]);
        let note = Note {
            loop_override: LoopOverride::ForceOn,
            envelope: Envelope {
                sustain: 0,
                ..Envelope::default()
            },
            ..pcm(0)
        };
        let bank = InstrumentBank::new(vec![Instrument::Single(SingleInstrument {
            name: None,
            note,
        })]);

        let result = assemble_bank(&bank, &mut library, &AssembleOptions::default());
        let region = result.bank.instruments[0].regions[0];
        assert!(region.looped);
        assert_eq!(region.envelope.sustain, 1440);
    }

    #[test]
    fn test_presets_follow_slot_ids() {
        let (_dir, mut library) = library_with(&[("00_a.wav", 8)]);
        let mut instruments = vec![Instrument::Null; 130];
        instruments[129] = Instrument::Single(SingleInstrument {
            name: Some("High".to_string()),
            note: pcm(0),
        });
        let bank = InstrumentBank::new(instruments);

        let options = AssembleOptions {
            bank_name: "Game".to_string(),
        };
        let result = assemble_bank(&bank, &mut library, &options);
        assert_eq!(result.bank.name, "Game");
        let preset = &result.bank.presets[0];
        assert_eq!((preset.program, preset.bank, preset.instrument), (1, 1, 0));
    }
}
