//! Block codec
//!
//! A block record inside a block file is framed as:
//!
//! ```text
//! magic          4 bytes = F9 BE B4 D9
//! recordLength   4 bytes LE
//! header         80 bytes
//! txCount        CompactInt
//! transactions   txCount records
//! ```

use crate::compact_int;
use crate::constants::*;
use crate::encode::{prealloc, read_exact_vec, Decodable, Encodable};
use crate::error::{ConsensusError, Result};
use crate::types::*;
use log::trace;
use std::io::{Cursor, Read, Write};

/// Read and check the 4-byte record magic.
///
/// A mismatch is [`ConsensusError::BadMagic`]; running out of bytes is
/// [`ConsensusError::Truncated`].
pub fn read_magic<R: Read>(reader: &mut R) -> Result<()> {
    let mut found = [0u8; 4];
    reader.read_exact(&mut found)?;
    if found != BLOCK_MAGIC {
        return Err(ConsensusError::BadMagic { found });
    }
    Ok(())
}

impl Encodable for BlockHeader {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let mut written = self.version.consensus_encode(writer)?;
        written += self.prev_block.consensus_encode(writer)?;
        written += self.merkle_root.consensus_encode(writer)?;
        written += self.timestamp.consensus_encode(writer)?;
        written += self.bits.consensus_encode(writer)?;
        written += self.nonce.consensus_encode(writer)?;
        Ok(written)
    }
}

impl Decodable for BlockHeader {
    fn consensus_decode<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(BlockHeader {
            version: u32::consensus_decode(reader)?,
            prev_block: DoubleHash::consensus_decode(reader)?,
            merkle_root: DoubleHash::consensus_decode(reader)?,
            timestamp: u32::consensus_decode(reader)?,
            bits: u32::consensus_decode(reader)?,
            nonce: u32::consensus_decode(reader)?,
        })
    }
}

impl BlockHeader {
    /// DoubleHash of the 80 serialized header bytes
    pub fn block_hash(&self) -> DoubleHash {
        DoubleHash::digest(&self.consensus_encode_to_vec())
    }
}

impl Block {
    /// Build a block, stamping its hash and each transaction's back-reference
    pub fn new(header: BlockHeader, mut transactions: Vec<Tx>) -> Self {
        let hash = header.block_hash();
        for tx in &mut transactions {
            tx.block = Some(hash);
        }
        Block { header, hash, transactions }
    }

    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn tx(&self, index: usize) -> Option<&Tx> {
        self.transactions.get(index)
    }

    /// Decode a framed record, refusing records larger than `max_record_size`
    pub fn consensus_decode_with_limit<R: Read>(reader: &mut R, max_record_size: usize) -> Result<Self> {
        read_magic(reader)?;
        let length = u32::consensus_decode(reader)? as usize;
        if length > max_record_size {
            return Err(ConsensusError::LimitExceeded(format!(
                "block record of {} bytes exceeds {} byte limit",
                length, max_record_size
            )));
        }
        let record = read_exact_vec(reader, length as u64)?;
        Block::decode_record(&record)
    }

    /// Decode the bytes inside one record frame (header onwards).
    ///
    /// Every byte of `record` must belong to the header or a transaction.
    pub fn decode_record(record: &[u8]) -> Result<Self> {
        if record.len() < BLOCK_HEADER_SIZE {
            return Err(ConsensusError::Truncated(format!(
                "block record of {} bytes is shorter than a header",
                record.len()
            )));
        }
        let hash = DoubleHash::digest(&record[..BLOCK_HEADER_SIZE]);

        let mut cursor = Cursor::new(record);
        let header = BlockHeader::consensus_decode(&mut cursor)?;
        let (tx_count, _) = compact_int::read(&mut cursor)?;
        trace!("decoding block {} with {} transactions", hash, tx_count);

        let mut transactions = Vec::with_capacity(prealloc(tx_count));
        for _ in 0..tx_count {
            let mut tx = Tx::consensus_decode(&mut cursor)?;
            tx.block = Some(hash);
            transactions.push(tx);
        }

        let consumed = cursor.position() as usize;
        if consumed != record.len() {
            return Err(ConsensusError::FrameMismatch { declared: record.len(), consumed });
        }
        Ok(Block { header, hash, transactions })
    }

    /// Header and transactions, without the magic/length frame
    pub fn record_bytes(&self) -> Vec<u8> {
        let mut record = self.header.consensus_encode_to_vec();
        record.extend(self.transactions.consensus_encode_to_vec());
        record
    }
}

impl Encodable for Block {
    /// Writes the full framed record: magic, length, header, transactions
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let record = self.record_bytes();
        let length = u32::try_from(record.len()).map_err(|_| {
            ConsensusError::LimitExceeded(format!("block record of {} bytes", record.len()))
        })?;
        writer.write_all(&BLOCK_MAGIC)?;
        length.consensus_encode(writer)?;
        writer.write_all(&record)?;
        Ok(RECORD_PREFIX_SIZE as usize + record.len())
    }
}

impl Decodable for Block {
    fn consensus_decode<R: Read>(reader: &mut R) -> Result<Self> {
        Block::consensus_decode_with_limit(reader, MAX_RECORD_SIZE)
    }
}
