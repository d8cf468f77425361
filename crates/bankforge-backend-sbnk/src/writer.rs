//! SBNK writer.
//!
//! Layout: 16-byte Nitro file header, then a single `DATA` block holding an
//! instrument record table (type, absolute body offset) followed by the
//! instrument bodies. The file is padded to a 4-byte boundary.

use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};
use thiserror::Error;

use bankforge_model::{Instrument, InstrumentBank, NativeBankEncoder, Note, NoteKind};

/// File magic.
pub const SBNK_MAGIC: &[u8; 4] = b"SBNK";

/// Data block magic.
pub const DATA_MAGIC: &[u8; 4] = b"DATA";

/// Byte order mark as stored little-endian.
pub const BYTE_ORDER_MARK: u16 = 0xFEFF;

/// Format version 1.0.
pub const SBNK_VERSION: u16 = 0x0100;

/// Size of the Nitro file header.
pub const SBNK_HEADER_SIZE: usize = 16;

/// Reserved bytes at the start of the `DATA` block payload.
const DATA_RESERVED: usize = 32;

/// Offset of the first instrument record.
const RECORDS_START: usize = SBNK_HEADER_SIZE + 8 + DATA_RESERVED + 4;

/// Size of one instrument record.
const RECORD_SIZE: usize = 4;

/// Size of a note definition.
pub const NOTE_DEFINITION_SIZE: usize = 10;

/// Regional instruments hold at most eight bands.
pub const MAX_REGIONS: usize = 8;

/// Instrument record type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InstrumentRecordType {
    Null = 0,
    Pcm = 1,
    Square = 2,
    Noise = 3,
    Range = 16,
    Regional = 17,
}

impl InstrumentRecordType {
    /// Record type of a single-note instrument.
    pub fn for_note(note: &Note) -> Self {
        match note.kind {
            NoteKind::Pcm => InstrumentRecordType::Pcm,
            NoteKind::SquareWave => InstrumentRecordType::Square,
            NoteKind::Noise => InstrumentRecordType::Noise,
        }
    }
}

/// SBNK encoding failures.
#[derive(Debug, Error)]
pub enum SbnkError {
    /// A regional instrument has more bands than the format can hold.
    #[error("instrument {id} has {count} regions (maximum 8)")]
    TooManyRegions { id: u16, count: usize },

    /// An instrument body starts beyond the 16-bit offset range.
    #[error("instrument {id} body offset {offset:#x} exceeds 0xFFFF; bank is too large")]
    OffsetOverflow { id: u16, offset: usize },

    /// The encoded file does not fit a 32-bit size.
    #[error("encoded bank of {0} bytes is too large")]
    FileTooLarge(usize),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Encoder for Nitro `SBNK` instrument banks.
#[derive(Debug, Clone, Default)]
pub struct SbnkEncoder {
    /// Wave archive slot referenced by every PCM note.
    pub wave_archive: u16,
}

impl SbnkEncoder {
    pub fn new(wave_archive: u16) -> Self {
        Self { wave_archive }
    }

    /// Write a note definition: waveform or duty, archive slot, root key,
    /// envelope registers and pan.
    fn write_note<W: Write>(&self, writer: &mut W, note: &Note) -> io::Result<()> {
        let env = &note.envelope;
        writer.write_u16::<LittleEndian>(note.waveform)?;
        let archive = match note.kind {
            NoteKind::Pcm => self.wave_archive,
            NoteKind::SquareWave | NoteKind::Noise => 0,
        };
        writer.write_u16::<LittleEndian>(archive)?;
        writer.write_all(&[
            note.root_key,
            env.attack,
            env.decay,
            env.sustain,
            env.release,
            env.pan,
        ])
    }

    /// Write a note definition prefixed by its 16-bit kind.
    fn write_tagged_note<W: Write>(&self, writer: &mut W, note: &Note) -> io::Result<()> {
        writer.write_u16::<LittleEndian>(InstrumentRecordType::for_note(note) as u16)?;
        self.write_note(writer, note)
    }

    /// Record type and body of one instrument.
    fn encode_body(
        &self,
        id: u16,
        instrument: &Instrument,
    ) -> Result<(InstrumentRecordType, Vec<u8>), SbnkError> {
        let mut body = Vec::new();
        let kind = match instrument {
            Instrument::Null => InstrumentRecordType::Null,
            Instrument::Single(single) => {
                self.write_note(&mut body, &single.note)?;
                InstrumentRecordType::for_note(&single.note)
            }
            Instrument::RangeKeyed(range) => {
                body.write_u8(range.min_key)?;
                body.write_u8(range.max_key())?;
                for (_, note) in range.dense_notes() {
                    self.write_tagged_note(&mut body, &note)?;
                }
                InstrumentRecordType::Range
            }
            Instrument::Regional(regional) => {
                let count = regional.regions.len();
                if count > MAX_REGIONS {
                    return Err(SbnkError::TooManyRegions { id, count });
                }
                let mut key_max = [0u8; MAX_REGIONS];
                for (slot, region) in key_max.iter_mut().zip(&regional.regions) {
                    *slot = region.key_max;
                }
                body.write_all(&key_max)?;
                for region in &regional.regions {
                    self.write_tagged_note(&mut body, &region.note)?;
                }
                InstrumentRecordType::Regional
            }
        };
        Ok((kind, body))
    }
}

impl NativeBankEncoder for SbnkEncoder {
    type Error = SbnkError;

    fn encode(&self, bank: &InstrumentBank) -> Result<Vec<u8>, SbnkError> {
        let count = bank.len();
        let mut offset = RECORDS_START + count * RECORD_SIZE;

        let mut records = Vec::with_capacity(count * RECORD_SIZE);
        let mut bodies = Vec::new();
        for (id, instrument) in bank.iter() {
            let (kind, body) = self.encode_body(id, instrument)?;
            let body_offset = if body.is_empty() { 0 } else { offset };
            let body_offset = u16::try_from(body_offset)
                .map_err(|_| SbnkError::OffsetOverflow { id, offset })?;

            records.write_u8(kind as u8)?;
            records.write_u16::<LittleEndian>(body_offset)?;
            records.write_u8(0)?;

            offset += body.len();
            bodies.extend_from_slice(&body);
        }

        let file_size = offset.next_multiple_of(4);
        let file_size32 =
            u32::try_from(file_size).map_err(|_| SbnkError::FileTooLarge(file_size))?;
        let block_size = file_size32 - SBNK_HEADER_SIZE as u32;

        let mut out = Vec::with_capacity(file_size);
        out.write_all(SBNK_MAGIC)?;
        out.write_u16::<LittleEndian>(BYTE_ORDER_MARK)?;
        out.write_u16::<LittleEndian>(SBNK_VERSION)?;
        out.write_u32::<LittleEndian>(file_size32)?;
        out.write_u16::<LittleEndian>(SBNK_HEADER_SIZE as u16)?;
        out.write_u16::<LittleEndian>(1)?;

        out.write_all(DATA_MAGIC)?;
        out.write_u32::<LittleEndian>(block_size)?;
        out.write_all(&[0u8; DATA_RESERVED])?;
        out.write_u32::<LittleEndian>(count as u32)?;
        out.extend_from_slice(&records);
        out.extend_from_slice(&bodies);
        out.resize(file_size, 0);

        Ok(out)
    }
}
