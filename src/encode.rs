//! Consensus-critical serialization and deserialization.

use crate::compact_int;
use crate::constants::MAX_SCRIPT_SIZE_ON_WIRE;
use crate::error::{ConsensusError, Result};
use crate::hash::DoubleHash;
use std::io::{Cursor, Read, Write};

/// Upper bound on speculative allocation for count-prefixed sequences
const MAX_PREALLOC: usize = 1024;

/// Upper bound on speculative allocation for length-prefixed byte strings
const MAX_BYTES_PREALLOC: usize = 64 * 1024;

pub trait Encodable {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize>;

    fn consensus_encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.consensus_encode(&mut buf);
        buf
    }
}

pub trait Decodable: Sized {
    fn consensus_decode<R: Read>(reader: &mut R) -> Result<Self>;

    /// Decode from a slice, requiring every byte to be consumed
    fn consensus_decode_from_slice(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        let value = Self::consensus_decode(&mut cursor)?;
        let consumed = cursor.position() as usize;
        if consumed != data.len() {
            return Err(ConsensusError::FrameMismatch { declared: data.len(), consumed });
        }
        Ok(value)
    }
}

/// Read a CompactInt-prefixed byte string.
///
/// Lengths above [`MAX_SCRIPT_SIZE_ON_WIRE`] are refused before any byte of
/// the body is read.
pub fn read_var_bytes<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let (len, _) = compact_int::read(reader)?;
    if len > MAX_SCRIPT_SIZE_ON_WIRE as u64 {
        return Err(ConsensusError::LimitExceeded(format!(
            "byte string of {} bytes exceeds {} byte limit",
            len, MAX_SCRIPT_SIZE_ON_WIRE
        )));
    }
    read_exact_vec(reader, len)
}

/// Read exactly `len` bytes into a fresh buffer.
///
/// The buffer grows with the bytes actually read, so `len` alone cannot force
/// a large allocation.
pub fn read_exact_vec<R: Read>(reader: &mut R, len: u64) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(len.min(MAX_BYTES_PREALLOC as u64) as usize);
    reader.by_ref().take(len).read_to_end(&mut buf)?;
    if (buf.len() as u64) != len {
        return Err(ConsensusError::Truncated(format!(
            "expected {} bytes, got {}",
            len,
            buf.len()
        )));
    }
    Ok(buf)
}

pub fn write_var_bytes<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<usize> {
    let mut written = compact_int::write(writer, bytes.len() as u64)?;
    writer.write_all(bytes)?;
    written += bytes.len();
    Ok(written)
}

/// Initial capacity for a sequence whose count came off the wire
pub(crate) fn prealloc(count: u64) -> usize {
    (count as usize).min(MAX_PREALLOC)
}

impl Encodable for u32 {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize> {
        writer.write_all(&self.to_le_bytes())?;
        Ok(4)
    }
}

impl Decodable for u32 {
    fn consensus_decode<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }
}

impl Encodable for u64 {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize> {
        writer.write_all(&self.to_le_bytes())?;
        Ok(8)
    }
}

impl Decodable for u64 {
    fn consensus_decode<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buf = [0u8; 8];
        reader.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }
}

impl Encodable for DoubleHash {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize> {
        writer.write_all(&self.0)?;
        Ok(32)
    }
}

impl Decodable for DoubleHash {
    fn consensus_decode<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buf = [0u8; 32];
        reader.read_exact(&mut buf)?;
        Ok(DoubleHash(buf))
    }
}

impl<T: Encodable> Encodable for Vec<T> {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let mut written = compact_int::write(writer, self.len() as u64)?;
        for item in self {
            written += item.consensus_encode(writer)?;
        }
        Ok(written)
    }
}

impl<T: Decodable> Decodable for Vec<T> {
    fn consensus_decode<R: Read>(reader: &mut R) -> Result<Self> {
        let (count, _) = compact_int::read(reader)?;
        let mut items = Vec::with_capacity(prealloc(count));
        for _ in 0..count {
            items.push(T::consensus_decode(reader)?);
        }
        Ok(items)
    }
}
