//! SBNK (Nitro instrument bank) file format validator.

use super::{read_u16, read_u32, FormatError};

/// An instrument record of the `DATA` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SbnkRecord {
    pub kind: u8,
    pub offset: u16,
}

/// Information extracted from an SBNK file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SbnkInfo {
    pub file_size: u32,
    pub version: u16,
    pub records: Vec<SbnkRecord>,
}

/// Body length implied by a record type, given the bytes at its offset.
fn body_len(kind: u8, body: &[u8]) -> Option<usize> {
    match kind {
        0 => Some(0),
        1..=3 => Some(10),
        16 => {
            let first = *body.first()? as usize;
            let last = *body.get(1)? as usize;
            (last >= first).then(|| 2 + (last - first + 1) * 12)
        }
        17 => {
            let keys = body.get(..8)?;
            // Unused slots are zero; a band may still end at key 0.
            let regions = keys.iter().rposition(|&k| k != 0).map_or(1, |i| i + 1);
            Some(8 + regions * 12)
        }
        _ => None,
    }
}

/// Validate an SBNK file and extract its instrument records.
pub fn validate_sbnk(data: &[u8]) -> Result<SbnkInfo, FormatError> {
    const MIN_SIZE: usize = 60;

    if data.len() < MIN_SIZE {
        return Err(FormatError::new(
            "SBNK",
            format!("File too short: {} bytes (minimum {} required)", data.len(), MIN_SIZE),
        ));
    }
    if &data[0..4] != b"SBNK" {
        return Err(FormatError::at_offset("SBNK", "invalid magic", 0));
    }
    if read_u16(data, 4) != 0xFEFF {
        return Err(FormatError::at_offset("SBNK", "invalid byte order mark", 4));
    }
    let version = read_u16(data, 6);
    let file_size = read_u32(data, 8);
    if file_size as usize != data.len() || data.len() % 4 != 0 {
        return Err(FormatError::at_offset(
            "SBNK",
            format!("file size {} does not match length {}", file_size, data.len()),
            8,
        ));
    }
    if read_u16(data, 12) != 16 || read_u16(data, 14) != 1 {
        return Err(FormatError::at_offset("SBNK", "unexpected header layout", 12));
    }
    if &data[16..20] != b"DATA" || read_u32(data, 20) as usize != data.len() - 16 {
        return Err(FormatError::at_offset("SBNK", "invalid DATA block", 16));
    }

    let count = read_u32(data, 56) as usize;
    let table_end = 60 + count * 4;
    if table_end > data.len() {
        return Err(FormatError::at_offset("SBNK", "record table overruns file", 56));
    }

    let mut records = Vec::with_capacity(count);
    for i in 0..count {
        let pos = 60 + i * 4;
        let record = SbnkRecord {
            kind: data[pos],
            offset: read_u16(data, pos + 1),
        };
        let offset = record.offset as usize;
        if record.kind == 0 {
            if offset != 0 {
                return Err(FormatError::at_offset("SBNK", "null record with offset", pos));
            }
        } else {
            let len = body_len(record.kind, data.get(offset..).unwrap_or(&[])).ok_or_else(|| {
                FormatError::at_offset("SBNK", format!("unknown record type {}", record.kind), pos)
            })?;
            if offset < table_end || offset + len > data.len() {
                return Err(FormatError::at_offset(
                    "SBNK",
                    format!("instrument {} body out of bounds", i),
                    pos,
                ));
            }
        }
        records.push(record);
    }

    Ok(SbnkInfo {
        file_size,
        version,
        records,
    })
}
