//! RIFF chunk primitives.

use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};

/// Fixed length of SF2 name fields, including the terminating NUL.
pub const NAME_LEN: usize = 20;

/// Write a fixed-length, NUL-terminated name field.
///
/// Names are cut to 19 bytes; non-ASCII characters become `_`.
pub fn write_name<W: Write>(writer: &mut W, name: &str) -> io::Result<()> {
    let mut buf = [0u8; NAME_LEN];
    for (slot, c) in buf[..NAME_LEN - 1].iter_mut().zip(name.chars()) {
        *slot = if c.is_ascii() && !c.is_ascii_control() {
            c as u8
        } else {
            b'_'
        };
    }
    writer.write_all(&buf)
}

/// Write a chunk header and body, padding odd bodies to a word boundary.
pub fn write_chunk<W: Write>(writer: &mut W, tag: &[u8; 4], body: &[u8]) -> io::Result<()> {
    let size = chunk_size(body.len())?;
    writer.write_all(tag)?;
    writer.write_u32::<LittleEndian>(size)?;
    writer.write_all(body)?;
    if body.len() % 2 == 1 {
        writer.write_u8(0)?;
    }
    Ok(())
}

/// Write a `LIST` chunk of the given form type around pre-built sub-chunks.
pub fn write_list<W: Write>(writer: &mut W, form: &[u8; 4], body: &[u8]) -> io::Result<()> {
    let size = chunk_size(body.len() + 4)?;
    writer.write_all(b"LIST")?;
    writer.write_u32::<LittleEndian>(size)?;
    writer.write_all(form)?;
    writer.write_all(body)?;
    if body.len() % 2 == 1 {
        writer.write_u8(0)?;
    }
    Ok(())
}

/// Bytes of a NUL-terminated string padded to an even length.
pub fn zstr_even(text: &str) -> Vec<u8> {
    let mut bytes: Vec<u8> = text
        .chars()
        .map(|c| if c.is_ascii() && c != '\0' { c as u8 } else { b'_' })
        .collect();
    bytes.push(0);
    if bytes.len() % 2 == 1 {
        bytes.push(0);
    }
    bytes
}

fn chunk_size(len: usize) -> io::Result<u32> {
    u32::try_from(len).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("chunk of {} bytes exceeds the RIFF size limit", len),
        )
    })
}
