//! SF2 file writer - assembles the INFO, sdta and pdta lists into a RIFF file.

use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use super::bank::Sf2Bank;
use super::chunk::{write_chunk, write_list, zstr_even};
use super::pdta::{pdta_body, SILENCE_PAD_FRAMES};

/// SoundFont version written to `ifil`.
pub const SF2_VERSION: (u16, u16) = (2, 1);

/// Sound engine tag written to `isng`.
pub const SOUND_ENGINE: &[u8; 8] = b"EMU8000\0";

impl Sf2Bank {
    /// Write the complete SoundFont to a seekable writer.
    ///
    /// The RIFF size is written as a placeholder and patched once the rest of
    /// the file is out.
    pub fn write<W: Write + Seek>(&self, writer: &mut W) -> io::Result<()> {
        let riff_start = writer.stream_position()?;
        writer.write_all(b"RIFF")?;
        writer.write_u32::<LittleEndian>(0)?;
        writer.write_all(b"sfbk")?;

        write_list(writer, b"INFO", &self.info_body()?)?;
        write_list(writer, b"sdta", &self.sdta_body()?)?;
        write_list(writer, b"pdta", &pdta_body(self)?)?;

        let riff_end = writer.stream_position()?;
        let riff_size = u32::try_from(riff_end - riff_start - 8).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "SoundFont exceeds 4 GiB")
        })?;
        writer.seek(SeekFrom::Start(riff_start + 4))?;
        writer.write_u32::<LittleEndian>(riff_size)?;
        writer.seek(SeekFrom::Start(riff_end))?;
        Ok(())
    }

    /// Write the bank to a byte vector.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut cursor = io::Cursor::new(Vec::new());
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Write the bank to a file, truncating any previous content.
    pub fn write_file(&self, path: &Path) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write(&mut writer)?;
        writer.flush()
    }

    /// Compute the BLAKE3 hash of the bank bytes.
    pub fn compute_hash(&self) -> io::Result<String> {
        let bytes = self.to_bytes()?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }

    fn info_body(&self) -> io::Result<Vec<u8>> {
        let mut body = Vec::new();

        let mut ifil = Vec::with_capacity(4);
        ifil.write_u16::<LittleEndian>(SF2_VERSION.0)?;
        ifil.write_u16::<LittleEndian>(SF2_VERSION.1)?;
        write_chunk(&mut body, b"ifil", &ifil)?;

        write_chunk(&mut body, b"isng", SOUND_ENGINE)?;
        write_chunk(&mut body, b"INAM", &zstr_even(&self.name))?;
        Ok(body)
    }

    fn sdta_body(&self) -> io::Result<Vec<u8>> {
        let frames = self.sample_frames() as usize + SILENCE_PAD_FRAMES;
        let mut smpl = Vec::with_capacity(frames * 2);
        for sample in &self.samples {
            for &frame in &sample.pcm {
                smpl.write_i16::<LittleEndian>(frame)?;
            }
        }
        smpl.resize(frames * 2, 0);

        let mut body = Vec::new();
        write_chunk(&mut body, b"smpl", &smpl)?;
        Ok(body)
    }
}
