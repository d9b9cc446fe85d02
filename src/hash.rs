//! DoubleHash identifiers and the single-round digests used by script

use bitcoin_hashes::{sha1 as bh_sha1, sha256d, Hash as BitcoinHash, HashEngine};
use ripemd::Ripemd160;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// 32-byte identifier: SHA256(SHA256(x))
///
/// Rendered as lowercase hex of the raw bytes, in stored order, with no prefix.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DoubleHash(pub [u8; 32]);

impl DoubleHash {
    pub const ZERO: DoubleHash = DoubleHash([0u8; 32]);

    /// Hash `data` twice with SHA256
    pub fn digest(data: &[u8]) -> Self {
        DoubleHash(double_sha256(data))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut out = [0u8; 32];
        hex::decode_to_slice(s, &mut out)?;
        Ok(DoubleHash(out))
    }
}

impl From<[u8; 32]> for DoubleHash {
    fn from(bytes: [u8; 32]) -> Self {
        DoubleHash(bytes)
    }
}

impl AsRef<[u8]> for DoubleHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for DoubleHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for DoubleHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DoubleHash({})", hex::encode(self.0))
    }
}

impl FromStr for DoubleHash {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DoubleHash::from_hex(s)
    }
}

impl Serialize for DoubleHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for DoubleHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        DoubleHash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// SHA256(SHA256(data))
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    let mut engine = sha256d::Hash::engine();
    engine.input(data);
    sha256d::Hash::from_engine(engine).into_inner()
}

pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

pub fn sha1(data: &[u8]) -> [u8; 20] {
    bh_sha1::Hash::hash(data).into_inner()
}

pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(data).into()
}

/// RIPEMD160(SHA256(data))
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_sha256_empty() {
        // Well-known SHA256d of the empty string
        assert_eq!(
            hex::encode(double_sha256(&[])),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    #[test]
    fn test_digest_matches_two_rounds() {
        let data = b"hello";
        let once = sha256(data);
        assert_eq!(DoubleHash::digest(data).0, sha256(&once));
    }

    #[test]
    fn test_display_is_lowercase_hex() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xAB;
        bytes[31] = 0x01;
        let hash = DoubleHash(bytes);
        let s = hash.to_string();
        assert_eq!(s.len(), 64);
        assert!(s.starts_with("ab"));
        assert!(s.ends_with("01"));
        assert_eq!(s, hash.to_hex());
    }

    #[test]
    fn test_hex_roundtrip() {
        let hash = DoubleHash::digest(b"block");
        let parsed: DoubleHash = hash.to_hex().parse().unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn test_from_hex_wrong_length() {
        assert!(DoubleHash::from_hex("abcd").is_err());
    }

    #[test]
    fn test_zero() {
        assert!(DoubleHash::ZERO.is_zero());
        assert!(!DoubleHash::digest(b"").is_zero());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let hash = DoubleHash([0x11; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", "11".repeat(32)));
        let back: DoubleHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn test_hash160_length() {
        assert_eq!(hash160(b"abc").len(), 20);
        assert_eq!(ripemd160(b"abc").len(), 20);
        assert_eq!(
            hex::encode(sha1(b"abc")),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }
}
