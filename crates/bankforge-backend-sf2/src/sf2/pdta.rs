//! Preset, instrument and sample header tables (`pdta` list).
//!
//! Every table is written by its own function: live records first, then the
//! terminal record. Terminal records are mandatory even for empty tables.

use std::io::{self, Write};
use std::rc::Rc;

use byteorder::{LittleEndian, WriteBytesExt};

use super::bank::{Sf2Bank, Sf2Instrument, Sf2Preset, Sf2Region};
use super::chunk::{write_chunk, write_name};
use crate::sample::WaveSample;

/// SF2 generator operators used by this writer.
pub mod generator {
    pub const PAN: u16 = 17;
    pub const ATTACK_VOL_ENV: u16 = 34;
    pub const DECAY_VOL_ENV: u16 = 36;
    pub const SUSTAIN_VOL_ENV: u16 = 37;
    pub const RELEASE_VOL_ENV: u16 = 38;
    pub const INSTRUMENT: u16 = 41;
    pub const KEY_RANGE: u16 = 43;
    pub const SAMPLE_ID: u16 = 53;
    pub const SAMPLE_MODES: u16 = 54;
    pub const OVERRIDING_ROOT_KEY: u16 = 58;
}

// Record sizes in bytes.
pub const PHDR_SIZE: usize = 38;
pub const BAG_SIZE: usize = 4;
pub const MOD_SIZE: usize = 10;
pub const GEN_SIZE: usize = 4;
pub const INST_SIZE: usize = 22;
pub const SHDR_SIZE: usize = 46;

/// Generator records emitted per instrument region.
pub const GENERATORS_PER_REGION: usize = 9;

/// Zero frames appended after the last sample.
pub const SILENCE_PAD_FRAMES: usize = 46;

/// Original pitch recorded in sample headers; regions override the root key.
pub const ORIGINAL_PITCH: u8 = 60;

/// `sfSampleType` for mono samples.
pub const MONO_SAMPLE: u16 = 1;

pub const TERMINAL_PRESET: &str = "EOP";
pub const TERMINAL_INSTRUMENT: &str = "EOI";
pub const TERMINAL_SAMPLE: &str = "EOS";

/// A generator record: operator plus 16-bit amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenRecord {
    pub oper: u16,
    pub amount: u16,
}

impl GenRecord {
    pub fn signed(oper: u16, amount: i16) -> Self {
        Self {
            oper,
            amount: amount as u16,
        }
    }

    pub fn unsigned(oper: u16, amount: u16) -> Self {
        Self { oper, amount }
    }

    /// Range amount: low byte first, high byte second.
    pub fn range(oper: u16, lo: u8, hi: u8) -> Self {
        Self {
            oper,
            amount: u16::from_le_bytes([lo, hi]),
        }
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u16::<LittleEndian>(self.oper)?;
        writer.write_u16::<LittleEndian>(self.amount)
    }
}

/// The nine generators of a region, in emission order.
pub fn region_generators(region: &Sf2Region) -> [GenRecord; GENERATORS_PER_REGION] {
    let env = &region.envelope;
    [
        GenRecord::signed(generator::PAN, env.pan),
        GenRecord::signed(generator::ATTACK_VOL_ENV, env.attack),
        GenRecord::signed(generator::DECAY_VOL_ENV, env.decay),
        GenRecord::signed(generator::SUSTAIN_VOL_ENV, env.sustain),
        GenRecord::signed(generator::RELEASE_VOL_ENV, env.release),
        GenRecord::range(generator::KEY_RANGE, region.key_lo, region.key_hi),
        GenRecord::unsigned(generator::SAMPLE_ID, region.sample_index),
        GenRecord::unsigned(generator::SAMPLE_MODES, u16::from(region.looped)),
        GenRecord::unsigned(generator::OVERRIDING_ROOT_KEY, region.root_key as u16),
    ]
}

/// Convert a running count to a 16-bit index field.
fn index16(count: usize, table: &str) -> io::Result<u16> {
    u16::try_from(count).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} index {} exceeds 65535", table, count),
        )
    })
}

fn index32(count: usize, table: &str) -> io::Result<u32> {
    u32::try_from(count).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} offset {} exceeds 32 bits", table, count),
        )
    })
}

fn write_preset_header<W: Write>(
    writer: &mut W,
    name: &str,
    program: u16,
    bank: u16,
    bag_index: u16,
) -> io::Result<()> {
    write_name(writer, name)?;
    writer.write_u16::<LittleEndian>(program)?;
    writer.write_u16::<LittleEndian>(bank)?;
    writer.write_u16::<LittleEndian>(bag_index)?;
    // library, genre, morphology
    writer.write_u32::<LittleEndian>(0)?;
    writer.write_u32::<LittleEndian>(0)?;
    writer.write_u32::<LittleEndian>(0)
}

/// `phdr`: one header per preset, each owning exactly one bag.
pub fn write_phdr<W: Write>(writer: &mut W, presets: &[Sf2Preset]) -> io::Result<()> {
    for (i, preset) in presets.iter().enumerate() {
        let bag = index16(i, "phdr")?;
        write_preset_header(writer, &preset.name, preset.program, preset.bank, bag)?;
    }
    let total = index16(presets.len(), "phdr")?;
    write_preset_header(writer, TERMINAL_PRESET, 0, 0, total)
}

/// `pbag`: bag `i` starts at generator `i`.
pub fn write_pbag<W: Write>(writer: &mut W, presets: &[Sf2Preset]) -> io::Result<()> {
    for i in 0..presets.len() {
        writer.write_u16::<LittleEndian>(index16(i, "pbag")?)?;
        writer.write_u16::<LittleEndian>(0)?;
    }
    writer.write_u16::<LittleEndian>(index16(presets.len(), "pbag")?)?;
    writer.write_u16::<LittleEndian>(0)
}

/// `pmod` / `imod`: no modulators, terminal record only.
pub fn write_empty_modulators<W: Write>(writer: &mut W) -> io::Result<()> {
    writer.write_all(&[0u8; MOD_SIZE])
}

/// `pgen`: each preset points at its instrument.
pub fn write_pgen<W: Write>(writer: &mut W, presets: &[Sf2Preset]) -> io::Result<()> {
    for preset in presets {
        GenRecord::unsigned(generator::INSTRUMENT, preset.instrument).write(writer)?;
    }
    GenRecord::unsigned(0, 0).write(writer)
}

/// `inst`: bag index is the count of regions of all prior instruments.
pub fn write_inst<W: Write>(writer: &mut W, instruments: &[Sf2Instrument]) -> io::Result<()> {
    let mut zones = 0usize;
    for instrument in instruments {
        write_name(writer, &instrument.name)?;
        writer.write_u16::<LittleEndian>(index16(zones, "inst")?)?;
        zones += instrument.regions.len();
    }
    write_name(writer, TERMINAL_INSTRUMENT)?;
    writer.write_u16::<LittleEndian>(index16(zones, "inst")?)
}

/// `ibag`: bag of region `n` starts at generator `9 * n`.
pub fn write_ibag<W: Write>(writer: &mut W, instruments: &[Sf2Instrument]) -> io::Result<()> {
    let mut generators = 0usize;
    for _ in instruments.iter().flat_map(|i| &i.regions) {
        writer.write_u16::<LittleEndian>(index16(generators, "ibag")?)?;
        writer.write_u16::<LittleEndian>(0)?;
        generators += GENERATORS_PER_REGION;
    }
    writer.write_u16::<LittleEndian>(index16(generators, "ibag")?)?;
    writer.write_u16::<LittleEndian>(0)
}

/// `igen`: nine generators per region.
pub fn write_igen<W: Write>(writer: &mut W, instruments: &[Sf2Instrument]) -> io::Result<()> {
    for region in instruments.iter().flat_map(|i| &i.regions) {
        for record in region_generators(region) {
            record.write(writer)?;
        }
    }
    GenRecord::unsigned(0, 0).write(writer)
}

/// `shdr`: sample positions are cumulative frame offsets into `smpl`.
pub fn write_shdr<W: Write>(writer: &mut W, samples: &[Rc<WaveSample>]) -> io::Result<()> {
    let mut offset = 0usize;
    for sample in samples {
        let end = offset + sample.pcm.len();
        write_name(writer, &sample.name)?;
        writer.write_u32::<LittleEndian>(index32(offset, "shdr")?)?;
        writer.write_u32::<LittleEndian>(index32(end, "shdr")?)?;
        writer.write_u32::<LittleEndian>(index32(offset + sample.loop_start as usize, "shdr")?)?;
        // Loop end is exclusive in the container.
        writer.write_u32::<LittleEndian>(index32(
            offset + sample.loop_end as usize + 1,
            "shdr",
        )?)?;
        writer.write_u32::<LittleEndian>(sample.sample_rate)?;
        writer.write_u8(ORIGINAL_PITCH)?;
        writer.write_i8(0)?;
        writer.write_u16::<LittleEndian>(0)?;
        writer.write_u16::<LittleEndian>(MONO_SAMPLE)?;
        offset = end;
    }
    write_name(writer, TERMINAL_SAMPLE)?;
    writer.write_all(&[0u8; SHDR_SIZE - 20])
}

/// Body of the `pdta` list: the nine tables in their fixed order.
pub fn pdta_body(bank: &Sf2Bank) -> io::Result<Vec<u8>> {
    let mut body = Vec::new();
    let mut table = Vec::new();

    write_phdr(&mut table, &bank.presets)?;
    write_chunk(&mut body, b"phdr", &table)?;
    table.clear();

    write_pbag(&mut table, &bank.presets)?;
    write_chunk(&mut body, b"pbag", &table)?;
    table.clear();

    write_empty_modulators(&mut table)?;
    write_chunk(&mut body, b"pmod", &table)?;
    table.clear();

    write_pgen(&mut table, &bank.presets)?;
    write_chunk(&mut body, b"pgen", &table)?;
    table.clear();

    write_inst(&mut table, &bank.instruments)?;
    write_chunk(&mut body, b"inst", &table)?;
    table.clear();

    write_ibag(&mut table, &bank.instruments)?;
    write_chunk(&mut body, b"ibag", &table)?;
    table.clear();

    write_empty_modulators(&mut table)?;
    write_chunk(&mut body, b"imod", &table)?;
    table.clear();

    write_igen(&mut table, &bank.instruments)?;
    write_chunk(&mut body, b"igen", &table)?;
    table.clear();

    write_shdr(&mut table, &bank.samples)?;
    write_chunk(&mut body, b"shdr", &table)?;

    Ok(body)
}
