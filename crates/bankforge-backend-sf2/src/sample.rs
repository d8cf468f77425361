//! WAV sample loading and loop metadata extraction.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};
use thiserror::Error;

/// Upper bound on chunks visited while scanning a RIFF file.
pub const MAX_SCANNED_CHUNKS: usize = 256;

/// Tag of the sampler chunk carrying loop points.
pub const SMPL_TAG: &[u8; 4] = b"smpl";

/// Offset of the loop count inside the `smpl` chunk body.
const SMPL_LOOP_COUNT_OFFSET: u64 = 28;
/// Offset of the first loop record's start frame.
const SMPL_FIRST_LOOP_START_OFFSET: u64 = 44;
/// Minimum body size holding the first loop's start and end.
const SMPL_MIN_SIZE_WITH_LOOP: u64 = 52;

/// Error type for sample loading.
#[derive(Debug, Error)]
pub enum SampleError {
    /// The file could not be opened or is not a WAV file.
    #[error("failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    /// Sample width other than 16 bits.
    #[error("unsupported sample width in '{path}': {bits} bits (only 16-bit PCM is supported)")]
    UnsupportedWidth { path: PathBuf, bits: u16 },

    /// Float samples.
    #[error("unsupported sample format in '{path}': only integer PCM is supported")]
    UnsupportedFormat { path: PathBuf },

    /// More than one channel.
    #[error("unsupported channel count in '{path}': {channels} (only mono is supported)")]
    UnsupportedChannels { path: PathBuf, channels: u16 },

    /// No sample frames.
    #[error("'{path}' contains no sample frames")]
    Empty { path: PathBuf },

    /// Sample data could not be decoded.
    #[error("failed to decode samples in '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
}

/// Outcome of looking up one chunk in a RIFF file.
///
/// `start..end` is the chunk body (after the 8-byte chunk header).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChunkScan {
    pub found: bool,
    pub start: u64,
    pub end: u64,
}

impl ChunkScan {
    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A mono 16-bit sample shared by every region that references it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveSample {
    /// Waveform reference this sample was loaded for.
    pub id: u16,
    pub name: String,
    pub pcm: Vec<i16>,
    pub sample_rate: u32,
    /// Inclusive loop start frame.
    pub loop_start: u32,
    /// Inclusive loop end frame.
    pub loop_end: u32,
    /// Whether the file declared a loop, as opposed to the default full span.
    pub loop_declared: bool,
}

impl WaveSample {
    /// Build a sample, sanitizing the declared loop span.
    ///
    /// A loop end of 0 or past the payload becomes the last frame; a loop
    /// start at or after the end becomes 0.
    pub fn from_pcm(
        id: u16,
        name: impl Into<String>,
        pcm: Vec<i16>,
        sample_rate: u32,
        declared_loop: Option<(u32, u32)>,
    ) -> Self {
        let frames = pcm.len() as u32;
        let last = frames.saturating_sub(1);
        let (mut loop_start, mut loop_end) = declared_loop.unwrap_or((0, 0));
        if loop_end == 0 || loop_end >= frames {
            loop_end = last;
        }
        if loop_start >= loop_end {
            loop_start = 0;
        }
        Self {
            id,
            name: name.into(),
            pcm,
            sample_rate,
            loop_start,
            loop_end,
            loop_declared: declared_loop.is_some(),
        }
    }

    /// Number of frames.
    pub fn frames(&self) -> u32 {
        self.pcm.len() as u32
    }
}

/// Find a chunk by tag, visiting at most [`MAX_SCANNED_CHUNKS`] chunks.
///
/// A file that is not RIFF/WAVE, or that ends mid-header, reports not found.
pub fn find_chunk<R: Read + Seek>(reader: &mut R, tag: &[u8; 4]) -> io::Result<ChunkScan> {
    reader.seek(SeekFrom::Start(0))?;

    let mut riff = [0u8; 4];
    let mut wave = [0u8; 4];
    if reader.read_exact(&mut riff).is_err() {
        return Ok(ChunkScan::not_found());
    }
    let riff_size = match reader.read_u32::<LittleEndian>() {
        Ok(size) => size as u64,
        Err(_) => return Ok(ChunkScan::not_found()),
    };
    if reader.read_exact(&mut wave).is_err() || &riff != b"RIFF" || &wave != b"WAVE" {
        return Ok(ChunkScan::not_found());
    }

    let riff_end = 8 + riff_size;
    let mut pos = 12u64;
    for _ in 0..MAX_SCANNED_CHUNKS {
        if pos + 8 > riff_end {
            break;
        }
        reader.seek(SeekFrom::Start(pos))?;
        let mut chunk_tag = [0u8; 4];
        if reader.read_exact(&mut chunk_tag).is_err() {
            break;
        }
        let size = match reader.read_u32::<LittleEndian>() {
            Ok(size) => size as u64,
            Err(_) => break,
        };
        let start = pos + 8;
        let end = start + size;
        if &chunk_tag == tag {
            return Ok(ChunkScan {
                found: true,
                start,
                end: end.min(riff_end),
            });
        }
        // Chunk bodies are word aligned.
        pos = end + (size & 1);
    }

    Ok(ChunkScan::not_found())
}

/// Read the first loop of the `smpl` chunk.
///
/// Any problem with the chunk yields `Ok(None)`; only I/O errors propagate.
pub fn read_loop_span<R: Read + Seek>(reader: &mut R) -> io::Result<Option<(u32, u32)>> {
    let scan = find_chunk(reader, SMPL_TAG)?;
    if !scan.found || scan.len() < SMPL_LOOP_COUNT_OFFSET + 4 {
        return Ok(None);
    }

    reader.seek(SeekFrom::Start(scan.start + SMPL_LOOP_COUNT_OFFSET))?;
    let loop_count = reader.read_u32::<LittleEndian>()?;
    if loop_count == 0 || scan.len() < SMPL_MIN_SIZE_WITH_LOOP {
        return Ok(None);
    }

    reader.seek(SeekFrom::Start(scan.start + SMPL_FIRST_LOOP_START_OFFSET))?;
    let start = reader.read_u32::<LittleEndian>()?;
    let end = reader.read_u32::<LittleEndian>()?;
    Ok(Some((start, end)))
}

/// Read loop points from a file, treating every failure as "no loop".
pub fn read_loop_span_from_path(path: &Path) -> Option<(u32, u32)> {
    let file = File::open(path).ok()?;
    read_loop_span(&mut BufReader::new(file)).ok().flatten()
}

/// Load a mono 16-bit WAV file.
///
/// # Arguments
/// * `path` - WAV file to load
/// * `id` - Waveform reference the file was resolved for
///
/// # Errors
/// Returns an error if the file cannot be opened or decoded, or is not mono
/// 16-bit integer PCM with at least one frame.
pub fn load_wave_sample(path: &Path, id: u16) -> Result<WaveSample, SampleError> {
    let declared_loop = read_loop_span_from_path(path);

    let mut reader = hound::WavReader::open(path).map_err(|source| SampleError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let spec = reader.spec();

    if spec.sample_format != hound::SampleFormat::Int {
        return Err(SampleError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }
    if spec.bits_per_sample != 16 {
        return Err(SampleError::UnsupportedWidth {
            path: path.to_path_buf(),
            bits: spec.bits_per_sample,
        });
    }
    if spec.channels != 1 {
        return Err(SampleError::UnsupportedChannels {
            path: path.to_path_buf(),
            channels: spec.channels,
        });
    }

    let pcm = reader
        .samples::<i16>()
        .collect::<Result<Vec<i16>, _>>()
        .map_err(|source| SampleError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
    if pcm.is_empty() {
        return Err(SampleError::Empty {
            path: path.to_path_buf(),
        });
    }

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("Sample{:03}", id));

    Ok(WaveSample::from_pcm(id, name, pcm, spec.sample_rate, declared_loop))
}
