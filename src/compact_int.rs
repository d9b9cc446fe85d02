//! CompactInt: the variable-length unsigned integer used for counts and lengths
//!
//! ```text
//! value < 0xfd          -> 1 byte:  value
//! value <= 0xffff       -> 0xfd + 2 bytes LE
//! value <= 0xffffffff   -> 0xfe + 4 bytes LE
//! otherwise             -> 0xff + 8 bytes LE
//! ```
//!
//! Decoding accepts any of the four forms, including non-minimal ones.

use crate::constants::{COMPACT_U16, COMPACT_U32, COMPACT_U64};
use crate::error::Result;
use std::io::{Read, Write};

/// Read a CompactInt, returning the value and the number of bytes consumed
pub fn read<R: Read>(reader: &mut R) -> Result<(u64, usize)> {
    let mut prefix = [0u8; 1];
    reader.read_exact(&mut prefix)?;

    match prefix[0] {
        COMPACT_U16 => {
            let mut buf = [0u8; 2];
            reader.read_exact(&mut buf)?;
            Ok((u16::from_le_bytes(buf) as u64, 3))
        }
        COMPACT_U32 => {
            let mut buf = [0u8; 4];
            reader.read_exact(&mut buf)?;
            Ok((u32::from_le_bytes(buf) as u64, 5))
        }
        COMPACT_U64 => {
            let mut buf = [0u8; 8];
            reader.read_exact(&mut buf)?;
            Ok((u64::from_le_bytes(buf), 9))
        }
        n => Ok((n as u64, 1)),
    }
}

/// Write the canonical (shortest) encoding of `value`
pub fn write<W: Write>(writer: &mut W, value: u64) -> Result<usize> {
    if value < COMPACT_U16 as u64 {
        writer.write_all(&[value as u8])?;
    } else if value <= 0xffff {
        writer.write_all(&[COMPACT_U16])?;
        writer.write_all(&(value as u16).to_le_bytes())?;
    } else if value <= 0xffff_ffff {
        writer.write_all(&[COMPACT_U32])?;
        writer.write_all(&(value as u32).to_le_bytes())?;
    } else {
        writer.write_all(&[COMPACT_U64])?;
        writer.write_all(&value.to_le_bytes())?;
    }
    Ok(encoded_len(value))
}

pub fn encode(value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_len(value));
    // Writing into a Vec cannot fail
    let _ = write(&mut buf, value);
    buf
}

/// Size in bytes of the canonical encoding of `value`
pub fn encoded_len(value: u64) -> usize {
    match value {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}
