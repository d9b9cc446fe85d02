//! Transaction codec
//!
//! ```text
//! version   4 bytes LE
//! inCount   CompactInt
//! inputs    {prevTx 32, prevIndex 4 LE, scriptLen CompactInt, script, sequence 4 LE}
//! outCount  CompactInt
//! outputs   {value 8 LE, scriptLen CompactInt, script}
//! locktime  4 bytes LE
//! ```

use crate::compact_int;
use crate::encode::{prealloc, read_var_bytes, write_var_bytes, Decodable, Encodable};
use crate::error::Result;
use crate::types::*;
use std::io::{Read, Write};

impl Encodable for TxIn {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let mut written = self.prev_tx.consensus_encode(writer)?;
        written += self.prev_index.consensus_encode(writer)?;
        written += write_var_bytes(writer, &self.script)?;
        written += self.sequence.consensus_encode(writer)?;
        Ok(written)
    }
}

impl Decodable for TxIn {
    fn consensus_decode<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(TxIn {
            prev_tx: DoubleHash::consensus_decode(reader)?,
            prev_index: u32::consensus_decode(reader)?,
            script: read_var_bytes(reader)?,
            sequence: u32::consensus_decode(reader)?,
        })
    }
}

impl Encodable for TxOut {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let mut written = self.value.consensus_encode(writer)?;
        written += write_var_bytes(writer, &self.script)?;
        Ok(written)
    }
}

impl Decodable for TxOut {
    fn consensus_decode<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(TxOut {
            value: u64::consensus_decode(reader)?,
            script: read_var_bytes(reader)?,
        })
    }
}

impl Encodable for Tx {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let mut written = self.version.consensus_encode(writer)?;
        written += self.inputs.consensus_encode(writer)?;
        written += self.outputs.consensus_encode(writer)?;
        written += self.lock_time.consensus_encode(writer)?;
        Ok(written)
    }
}

impl Decodable for Tx {
    /// Decode one transaction and stamp its hash.
    ///
    /// Any short read aborts the whole transaction.
    fn consensus_decode<R: Read>(reader: &mut R) -> Result<Self> {
        let version = u32::consensus_decode(reader)?;

        let (in_count, _) = compact_int::read(reader)?;
        let mut inputs = Vec::with_capacity(prealloc(in_count));
        for _ in 0..in_count {
            inputs.push(TxIn::consensus_decode(reader)?);
        }

        let (out_count, _) = compact_int::read(reader)?;
        let mut outputs = Vec::with_capacity(prealloc(out_count));
        for _ in 0..out_count {
            outputs.push(TxOut::consensus_decode(reader)?);
        }

        let lock_time = u32::consensus_decode(reader)?;
        Ok(Tx::new(version, inputs, outputs, lock_time))
    }
}

impl Tx {
    /// Build a transaction and stamp its hash
    pub fn new(version: u32, inputs: Vec<TxIn>, outputs: Vec<TxOut>, lock_time: u32) -> Self {
        let mut tx = Tx {
            version,
            inputs,
            outputs,
            lock_time,
            hash: DoubleHash::ZERO,
            block: None,
        };
        tx.refresh_hash();
        tx
    }

    /// DoubleHash of the canonical serialization
    pub fn compute_hash(&self) -> DoubleHash {
        DoubleHash::digest(&self.consensus_encode_to_vec())
    }

    pub fn refresh_hash(&mut self) {
        self.hash = self.compute_hash();
    }

    /// Generation transaction: a single input spending the all-zero hash
    pub fn is_coinbase(&self) -> bool {
        is_coinbase(self)
    }

    pub fn serialized_size(&self) -> usize {
        calculate_transaction_size(self)
    }
}

/// Check if transaction is coinbase
pub fn is_coinbase(tx: &Tx) -> bool {
    tx.inputs.len() == 1 && tx.inputs[0].prev_tx.is_zero()
}

/// Exact serialized size, computed without serializing
pub fn calculate_transaction_size(tx: &Tx) -> usize {
    let inputs: usize = tx
        .inputs
        .iter()
        .map(|i| 32 + 4 + compact_int::encoded_len(i.script.len() as u64) + i.script.len() + 4)
        .sum();
    let outputs: usize = tx
        .outputs
        .iter()
        .map(|o| 8 + compact_int::encoded_len(o.script.len() as u64) + o.script.len())
        .sum();
    4 + compact_int::encoded_len(tx.inputs.len() as u64)
        + inputs
        + compact_int::encoded_len(tx.outputs.len() as u64)
        + outputs
        + 4
}
