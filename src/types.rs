//! Decoded block-file records

use serde::{Deserialize, Serialize};

pub use crate::hash::DoubleHash;

/// Byte string type
pub type ByteString = Vec<u8>;

/// Transaction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIn {
    pub prev_tx: DoubleHash,
    pub prev_index: u32,
    #[serde(with = "script_hex")]
    pub script: ByteString,
    pub sequence: u32,
}

/// Transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    pub value: u64,
    #[serde(with = "script_hex")]
    pub script: ByteString,
}

/// Transaction.
///
/// `hash` is stamped from the canonical serialization when the transaction is
/// decoded or built with [`Tx::new`]; call [`Tx::refresh_hash`] after mutating
/// fields by hand. `block` is a back-reference to the containing block, not an
/// ownership link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    pub version: u32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
    pub hash: DoubleHash,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<DoubleHash>,
}

/// Block Header: 80 bytes on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: u32,
    pub prev_block: DoubleHash,
    pub merkle_root: DoubleHash,
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
}

/// Block: header, derived hash and owned transactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub hash: DoubleHash,
    pub transactions: Vec<Tx>,
}

/// Scripts travel as lowercase hex strings in serde formats
mod script_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txout_serializes_script_as_hex() {
        let out = TxOut { value: 50, script: vec![0x76, 0xa9] };
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["script"], "76a9");
        assert_eq!(json["value"], 50);
        let back: TxOut = serde_json::from_value(json).unwrap();
        assert_eq!(back, out);
    }

    #[test]
    fn test_tx_block_backref_omitted_when_absent() {
        let tx = Tx {
            version: 1,
            inputs: vec![],
            outputs: vec![],
            lock_time: 0,
            hash: DoubleHash::ZERO,
            block: None,
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert!(json.get("block").is_none());
        assert_eq!(json["hash"], "00".repeat(32));
    }
}
