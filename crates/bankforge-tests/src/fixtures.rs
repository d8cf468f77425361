//! Test fixture utilities for creating instrument tables and sample folders.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A sawtooth ramp of the given length.
pub fn ramp(frames: usize) -> Vec<i16> {
    (0..frames).map(|i| ((i % 128) as i16 - 64) * 128).collect()
}

/// Encode mono 16-bit PCM as a WAV file, optionally with a `smpl` chunk
/// declaring one loop.
pub fn wav_bytes(pcm: &[i16], sample_rate: u32, loop_span: Option<(u32, u32)>) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("Failed to create WAV");
        for &frame in pcm {
            writer.write_sample(frame).expect("Failed to write sample");
        }
        writer.finalize().expect("Failed to finalize WAV");
    }
    let mut bytes = cursor.into_inner();

    if let Some((start, end)) = loop_span {
        // 36-byte sampler header, then one 24-byte loop record
        let mut body = vec![0u8; 36];
        body[28..32].copy_from_slice(&1u32.to_le_bytes());
        let mut record = [0u8; 24];
        record[8..12].copy_from_slice(&start.to_le_bytes());
        record[12..16].copy_from_slice(&end.to_le_bytes());
        body.extend_from_slice(&record);

        bytes.extend_from_slice(b"smpl");
        bytes.extend_from_slice(&(body.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&body);
        let riff_size = (bytes.len() - 8) as u32;
        bytes[4..8].copy_from_slice(&riff_size.to_le_bytes());
    }
    bytes
}

/// A temporary project: an instrument table next to a `samples` folder.
pub struct BankFixture {
    pub root: TempDir,
    pub samples_dir: PathBuf,
}

impl BankFixture {
    /// Create a fixture with an empty `samples` folder.
    pub fn new() -> Self {
        let fixture = Self::without_samples();
        fs::create_dir_all(&fixture.samples_dir).expect("Failed to create samples dir");
        fixture
    }

    /// Create a fixture whose `samples` folder does not exist.
    pub fn without_samples() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let samples_dir = root.path().join("samples");
        Self { root, samples_dir }
    }

    /// Get the project root path.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Write an instrument table and return its path.
    pub fn write_table(&self, name: &str, csv: &str) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, csv).expect("Failed to write table");
        path
    }

    /// Add a sample file to the `samples` folder.
    pub fn add_sample(
        &self,
        file_name: &str,
        pcm: &[i16],
        sample_rate: u32,
        loop_span: Option<(u32, u32)>,
    ) -> PathBuf {
        let path = self.samples_dir.join(file_name);
        fs::write(&path, wav_bytes(pcm, sample_rate, loop_span)).expect("Failed to write sample");
        path
    }
}

impl Default for BankFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_bytes_with_loop_is_readable() {
        let bytes = wav_bytes(&ramp(32), 22050, Some((4, 20)));
        let reader = hound::WavReader::new(Cursor::new(&bytes)).unwrap();
        assert_eq!(reader.len(), 32);
        assert_eq!(
            u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize,
            bytes.len() - 8
        );
        assert_eq!(&bytes[bytes.len() - 68..bytes.len() - 64], b"smpl");
    }

    #[test]
    fn test_fixture_layout() {
        let fixture = BankFixture::new();
        assert!(fixture.samples_dir.is_dir());
        let table = fixture.write_table("bank.csv", "InstrumentID,Type\n");
        assert!(table.exists());

        let bare = BankFixture::without_samples();
        assert!(!bare.samples_dir.exists());
    }
}
