//! Random access to the blocks stored in a block file
//!
//! Opening a file performs one forward scan that records the start offset of
//! every record; blocks are decoded on demand by ordinal position.

use crate::block::read_magic;
use crate::config::BlockLimits;
use crate::constants::RECORD_PREFIX_SIZE;
use crate::encode::Decodable;
use crate::error::{ConsensusError, Result};
use crate::types::Block;
use log::{debug, trace, warn};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// An indexed block file.
///
/// Every read seeks the single underlying handle, so all access goes through
/// `&mut self`.
#[derive(Debug)]
pub struct BlockFile<R> {
    reader: R,
    offsets: Vec<u64>,
    limits: BlockLimits,
}

impl BlockFile<BufReader<File>> {
    /// Open and index the block file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_limits(path, BlockLimits::default())
    }

    pub fn open_with_limits<P: AsRef<Path>>(path: P, limits: BlockLimits) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let block_file = BlockFile::with_limits(BufReader::new(file), limits)?;
        debug!("indexed {} blocks in {}", block_file.count(), path.display());
        Ok(block_file)
    }
}

impl<R: Read + Seek> BlockFile<R> {
    pub fn from_reader(reader: R) -> Result<Self> {
        Self::with_limits(reader, BlockLimits::default())
    }

    pub fn with_limits(mut reader: R, limits: BlockLimits) -> Result<Self> {
        let offsets = index_blocks(&mut reader)?;
        Ok(BlockFile { reader, offsets, limits })
    }

    /// Number of indexed blocks
    pub fn count(&self) -> usize {
        self.offsets.len()
    }

    /// Start offset of every record, in file order
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// Decode the block at ordinal `index`
    pub fn block_at(&mut self, index: usize) -> Result<Block> {
        let offset = *self.offsets.get(index).ok_or(ConsensusError::IndexOutOfRange {
            index,
            count: self.offsets.len(),
        })?;
        self.reader.seek(SeekFrom::Start(offset))?;
        Block::consensus_decode_with_limit(&mut self.reader, self.limits.max_record_size)
    }

    /// Decode every block in order; each item is independent of the others
    pub fn blocks(&mut self) -> Blocks<'_, R> {
        Blocks { file: self, next: 0 }
    }

    /// Release the underlying handle
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Iterator over the blocks of a [`BlockFile`]
pub struct Blocks<'a, R> {
    file: &'a mut BlockFile<R>,
    next: usize,
}

impl<'a, R: Read + Seek> Iterator for Blocks<'a, R> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.file.count() {
            return None;
        }
        let index = self.next;
        self.next += 1;
        let result = self.file.block_at(index);
        if let Err(ref e) = result {
            warn!("block {} failed to decode: {}", index, e);
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.file.count().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

/// Scan record frames from the start of the stream to its end
fn index_blocks<R: Read + Seek>(reader: &mut R) -> Result<Vec<u64>> {
    let end = reader.seek(SeekFrom::End(0))?;
    let mut offset = reader.seek(SeekFrom::Start(0))?;
    let mut offsets = Vec::new();

    // A record boundary landing exactly on the end is a clean finish
    while offset < end {
        read_magic(reader)?;
        let length = u32::consensus_decode(reader)? as u64;
        let next = offset + RECORD_PREFIX_SIZE + length;
        if next > end {
            return Err(ConsensusError::Truncated(format!(
                "block at offset {} declares {} bytes, file ends at {}",
                offset, length, end
            )));
        }
        trace!("block {} at offset {} ({} bytes)", offsets.len(), offset, length);
        offsets.push(offset);
        offset = reader.seek(SeekFrom::Start(next))?;
    }
    Ok(offsets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::Encodable;
    use crate::types::{BlockHeader, DoubleHash};
    use std::io::Cursor;

    fn block(nonce: u32) -> Block {
        Block::new(
            BlockHeader {
                version: 1,
                prev_block: DoubleHash::ZERO,
                merkle_root: DoubleHash([nonce as u8; 32]),
                timestamp: 1_300_000_000,
                bits: 0x1d00ffff,
                nonce,
            },
            vec![],
        )
    }

    fn file_of(blocks: &[Block]) -> Vec<u8> {
        blocks.iter().flat_map(|b| b.consensus_encode_to_vec()).collect()
    }

    #[test]
    fn test_index_offsets() {
        let data = file_of(&[block(1), block(2), block(3)]);
        let bf = BlockFile::from_reader(Cursor::new(data)).unwrap();
        assert_eq!(bf.count(), 3);
        assert_eq!(bf.offsets(), &[0, 89, 178]);
    }

    #[test]
    fn test_empty_file() {
        let bf = BlockFile::from_reader(Cursor::new(Vec::new())).unwrap();
        assert_eq!(bf.count(), 0);
    }

    #[test]
    fn test_block_at_random_access() {
        let blocks = [block(1), block(2), block(3)];
        let mut bf = BlockFile::from_reader(Cursor::new(file_of(&blocks))).unwrap();
        assert_eq!(bf.block_at(2).unwrap(), blocks[2]);
        assert_eq!(bf.block_at(0).unwrap(), blocks[0]);
    }

    #[test]
    fn test_block_at_out_of_range() {
        let mut bf = BlockFile::from_reader(Cursor::new(file_of(&[block(1)]))).unwrap();
        let err = bf.block_at(1).unwrap_err();
        assert!(matches!(err, ConsensusError::IndexOutOfRange { index: 1, count: 1 }));
    }

    #[test]
    fn test_bad_magic_in_scan() {
        let mut data = file_of(&[block(1)]);
        data.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0]);
        let err = BlockFile::from_reader(Cursor::new(data)).unwrap_err();
        assert!(matches!(err, ConsensusError::BadMagic { found: [0, 0, 0, 0] }));
    }

    #[test]
    fn test_truncated_record_in_scan() {
        let mut data = file_of(&[block(1), block(2)]);
        data.truncate(data.len() - 10);
        assert!(BlockFile::from_reader(Cursor::new(data)).unwrap_err().is_truncated());
    }

    #[test]
    fn test_partial_magic_in_scan() {
        let mut data = file_of(&[block(1)]);
        data.extend_from_slice(&[0xf9, 0xbe]);
        assert!(BlockFile::from_reader(Cursor::new(data)).unwrap_err().is_truncated());
    }

    #[test]
    fn test_index_through_buffered_reader() {
        let blocks: Vec<Block> = (0..50).map(block).collect();
        let reader = BufReader::new(Cursor::new(file_of(&blocks)));
        let mut bf = BlockFile::from_reader(reader).unwrap();
        assert_eq!(bf.count(), 50);
        assert_eq!(bf.offsets()[49], 49 * 89);
        assert_eq!(bf.block_at(49).unwrap(), blocks[49]);
        assert_eq!(bf.block_at(0).unwrap(), blocks[0]);
    }

    #[test]
    fn test_index_ignores_starting_position() {
        let blocks = [block(1), block(2)];
        let mut cursor = Cursor::new(file_of(&blocks));
        cursor.set_position(89);
        let bf = BlockFile::from_reader(cursor).unwrap();
        assert_eq!(bf.offsets(), &[0, 89]);
    }

    #[test]
    fn test_blocks_iterator() {
        let blocks = [block(4), block(5)];
        let mut bf = BlockFile::from_reader(Cursor::new(file_of(&blocks))).unwrap();
        let decoded: Result<Vec<Block>> = bf.blocks().collect();
        assert_eq!(decoded.unwrap(), blocks.to_vec());
    }
}
