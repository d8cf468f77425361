//! SF2 (SoundFont 2) file format validator.

use super::{extract_string, read_u16, read_u32, FormatError};

const PDTA_TABLES: [(&[u8; 4], usize); 9] = [
    (b"phdr", 38),
    (b"pbag", 4),
    (b"pmod", 10),
    (b"pgen", 4),
    (b"inst", 22),
    (b"ibag", 4),
    (b"imod", 10),
    (b"igen", 4),
    (b"shdr", 46),
];

/// A preset header record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sf2PresetHeader {
    pub name: String,
    pub program: u16,
    pub bank: u16,
    pub bag_index: u16,
}

/// An instrument header record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sf2InstHeader {
    pub name: String,
    pub bag_index: u16,
}

/// A generator record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sf2Generator {
    pub oper: u16,
    pub amount: u16,
}

impl Sf2Generator {
    pub fn signed(&self) -> i16 {
        self.amount as i16
    }

    /// Low and high byte of a range amount.
    pub fn range(&self) -> (u8, u8) {
        let [lo, hi] = self.amount.to_le_bytes();
        (lo, hi)
    }
}

/// A sample header record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sf2SampleHeader {
    pub name: String,
    pub start: u32,
    pub end: u32,
    pub loop_start: u32,
    pub loop_end: u32,
    pub sample_rate: u32,
    pub original_pitch: u8,
    pub sample_type: u16,
}

/// Information extracted from an SF2 file. Header tables include their
/// terminal records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sf2Info {
    pub version: (u16, u16),
    pub sound_engine: String,
    pub name: String,
    /// PCM frames in the `smpl` chunk, silence pad included.
    pub sample_frames: usize,
    pub presets: Vec<Sf2PresetHeader>,
    /// (generator index, modulator index) per preset bag.
    pub preset_bags: Vec<(u16, u16)>,
    pub preset_generators: Vec<Sf2Generator>,
    pub instruments: Vec<Sf2InstHeader>,
    /// (generator index, modulator index) per instrument bag.
    pub instrument_bags: Vec<(u16, u16)>,
    pub instrument_generators: Vec<Sf2Generator>,
    pub samples: Vec<Sf2SampleHeader>,
}

impl Sf2Info {
    /// Generators of the `n`-th instrument zone.
    pub fn zone_generators(&self, zone: usize) -> &[Sf2Generator] {
        let start = self.instrument_bags[zone].0 as usize;
        let end = self.instrument_bags[zone + 1].0 as usize;
        &self.instrument_generators[start..end]
    }

    /// Zone indices of the `n`-th instrument.
    pub fn instrument_zones(&self, instrument: usize) -> std::ops::Range<usize> {
        let start = self.instruments[instrument].bag_index as usize;
        let end = self.instruments[instrument + 1].bag_index as usize;
        start..end
    }
}

/// A chunk located in the file.
struct Chunk<'a> {
    tag: [u8; 4],
    offset: usize,
    body: &'a [u8],
}

/// Split a region into its chunks.
fn chunks(data: &[u8], base: usize) -> Result<Vec<Chunk<'_>>, FormatError> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        if pos + 8 > data.len() {
            return Err(FormatError::at_offset("SF2", "truncated chunk header", base + pos));
        }
        let size = read_u32(data, pos + 4) as usize;
        let end = pos + 8 + size;
        if end > data.len() {
            return Err(FormatError::at_offset(
                "SF2",
                format!("chunk of {} bytes overruns its parent", size),
                base + pos,
            ));
        }
        out.push(Chunk {
            tag: [data[pos], data[pos + 1], data[pos + 2], data[pos + 3]],
            offset: base + pos,
            body: &data[pos + 8..end],
        });
        pos = end + (size & 1);
    }
    Ok(out)
}

/// Find a `LIST` of the given form type and return its sub-chunks.
fn list<'a>(top: &[Chunk<'a>], form: &[u8; 4]) -> Result<Vec<Chunk<'a>>, FormatError> {
    let chunk = top
        .iter()
        .find(|c| &c.tag == b"LIST" && c.body.len() >= 4 && &c.body[0..4] == form)
        .ok_or_else(|| {
            FormatError::new(
                "SF2",
                format!("missing LIST {}", String::from_utf8_lossy(form)),
            )
        })?;
    chunks(&chunk.body[4..], chunk.offset + 12)
}

fn sub<'a, 'b>(chunks: &'b [Chunk<'a>], tag: &[u8; 4]) -> Result<&'b Chunk<'a>, FormatError> {
    chunks
        .iter()
        .find(|c| &c.tag == tag)
        .ok_or_else(|| FormatError::new("SF2", format!("missing {}", String::from_utf8_lossy(tag))))
}

fn bags(body: &[u8]) -> Vec<(u16, u16)> {
    body.chunks(4)
        .map(|r| (read_u16(r, 0), read_u16(r, 2)))
        .collect()
}

fn generators(body: &[u8]) -> Vec<Sf2Generator> {
    body.chunks(4)
        .map(|r| Sf2Generator {
            oper: read_u16(r, 0),
            amount: read_u16(r, 2),
        })
        .collect()
}

/// Validate an SF2 file and extract its structure.
///
/// Checks the RIFF envelope, the presence and order of the nine `pdta`
/// tables, record sizes, terminal records and that every index stays in
/// range.
pub fn validate_sf2(data: &[u8]) -> Result<Sf2Info, FormatError> {
    if data.len() < 12 {
        return Err(FormatError::new(
            "SF2",
            format!("File too short: {} bytes", data.len()),
        ));
    }
    if &data[0..4] != b"RIFF" || &data[8..12] != b"sfbk" {
        return Err(FormatError::at_offset("SF2", "not a RIFF sfbk file", 0));
    }
    let riff_size = read_u32(data, 4) as usize;
    if riff_size + 8 != data.len() {
        return Err(FormatError::at_offset(
            "SF2",
            format!("RIFF size {} does not match file length {}", riff_size, data.len()),
            4,
        ));
    }

    let top = chunks(&data[12..], 12)?;

    // INFO
    let info = list(&top, b"INFO")?;
    let ifil = sub(&info, b"ifil")?;
    if ifil.body.len() != 4 {
        return Err(FormatError::at_offset("SF2", "ifil must be 4 bytes", ifil.offset));
    }
    let version = (read_u16(ifil.body, 0), read_u16(ifil.body, 2));
    let sound_engine = extract_string(sub(&info, b"isng")?.body);
    let inam = sub(&info, b"INAM")?;
    if inam.body.len() % 2 != 0 || inam.body.last() != Some(&0) {
        return Err(FormatError::at_offset(
            "SF2",
            "INAM must be NUL-terminated and even-sized",
            inam.offset,
        ));
    }
    let name = extract_string(inam.body);

    // sdta
    let sdta = list(&top, b"sdta")?;
    let smpl = sub(&sdta, b"smpl")?;
    if smpl.body.len() % 2 != 0 {
        return Err(FormatError::at_offset("SF2", "odd smpl size", smpl.offset));
    }
    let sample_frames = smpl.body.len() / 2;

    // pdta
    let pdta = list(&top, b"pdta")?;
    if pdta.len() != PDTA_TABLES.len() {
        return Err(FormatError::new(
            "SF2",
            format!("pdta holds {} chunks, expected 9", pdta.len()),
        ));
    }
    for (chunk, (tag, record)) in pdta.iter().zip(PDTA_TABLES) {
        if &chunk.tag != tag {
            return Err(FormatError::at_offset(
                "SF2",
                format!(
                    "expected {}, found {}",
                    String::from_utf8_lossy(tag),
                    String::from_utf8_lossy(&chunk.tag)
                ),
                chunk.offset,
            ));
        }
        if chunk.body.is_empty() || chunk.body.len() % record != 0 {
            return Err(FormatError::at_offset(
                "SF2",
                format!(
                    "{} size {} is not a positive multiple of {}",
                    String::from_utf8_lossy(tag),
                    chunk.body.len(),
                    record
                ),
                chunk.offset,
            ));
        }
    }

    let presets: Vec<Sf2PresetHeader> = pdta[0]
        .body
        .chunks(38)
        .map(|r| Sf2PresetHeader {
            name: extract_string(&r[0..20]),
            program: read_u16(r, 20),
            bank: read_u16(r, 22),
            bag_index: read_u16(r, 24),
        })
        .collect();
    let preset_bags = bags(pdta[1].body);
    let preset_generators = generators(pdta[3].body);
    let instruments: Vec<Sf2InstHeader> = pdta[4]
        .body
        .chunks(22)
        .map(|r| Sf2InstHeader {
            name: extract_string(&r[0..20]),
            bag_index: read_u16(r, 20),
        })
        .collect();
    let instrument_bags = bags(pdta[5].body);
    let instrument_generators = generators(pdta[7].body);
    let samples: Vec<Sf2SampleHeader> = pdta[8]
        .body
        .chunks(46)
        .map(|r| Sf2SampleHeader {
            name: extract_string(&r[0..20]),
            start: read_u32(r, 20),
            end: read_u32(r, 24),
            loop_start: read_u32(r, 28),
            loop_end: read_u32(r, 32),
            sample_rate: read_u32(r, 36),
            original_pitch: r[40],
            sample_type: read_u16(r, 44),
        })
        .collect();

    let info = Sf2Info {
        version,
        sound_engine,
        name,
        sample_frames,
        presets,
        preset_bags,
        preset_generators,
        instruments,
        instrument_bags,
        instrument_generators,
        samples,
    };
    check_terminals(&info)?;
    check_indices(&info)?;
    Ok(info)
}

fn check_terminals(info: &Sf2Info) -> Result<(), FormatError> {
    let (eop, eoi, eos) = match (info.presets.last(), info.instruments.last(), info.samples.last()) {
        (Some(p), Some(i), Some(s)) => (p, i, s),
        _ => return Err(FormatError::new("SF2", "header table without records")),
    };
    if eop.name != "EOP" || eoi.name != "EOI" || eos.name != "EOS" {
        return Err(FormatError::new("SF2", "missing terminal record"));
    }
    if eop.bag_index as usize + 1 != info.preset_bags.len() {
        return Err(FormatError::new("SF2", "EOP bag index does not close pbag"));
    }
    if eoi.bag_index as usize + 1 != info.instrument_bags.len() {
        return Err(FormatError::new("SF2", "EOI bag index does not close ibag"));
    }
    let last_pbag = info.preset_bags[info.preset_bags.len() - 1].0 as usize;
    if last_pbag + 1 != info.preset_generators.len() {
        return Err(FormatError::new("SF2", "terminal pbag does not close pgen"));
    }
    let last_ibag = info.instrument_bags[info.instrument_bags.len() - 1].0 as usize;
    if last_ibag + 1 != info.instrument_generators.len() {
        return Err(FormatError::new("SF2", "terminal ibag does not close igen"));
    }
    Ok(())
}

fn check_indices(info: &Sf2Info) -> Result<(), FormatError> {
    let monotonic = |values: Vec<usize>| values.windows(2).all(|w| w[0] <= w[1]);
    if !monotonic(info.presets.iter().map(|p| p.bag_index as usize).collect())
        || !monotonic(info.instruments.iter().map(|i| i.bag_index as usize).collect())
        || !monotonic(info.preset_bags.iter().map(|b| b.0 as usize).collect())
        || !monotonic(info.instrument_bags.iter().map(|b| b.0 as usize).collect())
    {
        return Err(FormatError::new("SF2", "bag or generator indices decrease"));
    }

    let live_samples = info.samples.len() - 1;
    for g in &info.instrument_generators {
        if g.oper == 53 && g.amount as usize >= live_samples {
            return Err(FormatError::new(
                "SF2",
                format!("sample index {} out of range", g.amount),
            ));
        }
    }
    let live_instruments = info.instruments.len() - 1;
    for g in &info.preset_generators {
        if g.oper == 41 && g.amount as usize >= live_instruments {
            return Err(FormatError::new(
                "SF2",
                format!("instrument index {} out of range", g.amount),
            ));
        }
    }
    for s in &info.samples[..live_samples] {
        let ordered = s.start <= s.loop_start && s.loop_start < s.loop_end && s.loop_end <= s.end;
        if !ordered || s.end as usize > info.sample_frames {
            return Err(FormatError::new(
                "SF2",
                format!("sample '{}' has inconsistent positions", s.name),
            ));
        }
    }
    Ok(())
}
