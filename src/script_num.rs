//! ScriptNumber: sign-magnitude little-endian integers used by script arithmetic
//!
//! The magnitude is stored little-endian and the top bit of the final byte is
//! the sign. Zero encodes to the empty byte string. `[0x80]` is "negative
//! zero": it decodes to 0 and coerces to false.

use crate::constants::MAX_SCRIPT_NUM_LEN;
use crate::error::{ConsensusError, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScriptNumber(pub i64);

impl ScriptNumber {
    pub const ZERO: ScriptNumber = ScriptNumber(0);

    /// Decode up to 8 bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_limited(bytes, MAX_SCRIPT_NUM_LEN)
    }

    /// Decode with a caller-chosen length limit (never wider than 8 bytes)
    pub fn from_bytes_limited(bytes: &[u8], max_len: usize) -> Result<Self> {
        let max = max_len.min(MAX_SCRIPT_NUM_LEN);
        if bytes.len() > max {
            return Err(ConsensusError::NumberTooLong { len: bytes.len(), max });
        }
        let Some((&last, _)) = bytes.split_last() else {
            return Ok(ScriptNumber::ZERO);
        };

        let mut magnitude: u64 = 0;
        for (i, &b) in bytes.iter().enumerate() {
            let b = if i == bytes.len() - 1 { b & 0x7f } else { b };
            magnitude |= (b as u64) << (8 * i);
        }
        // At most 63 magnitude bits remain once the sign bit is stripped
        let value = magnitude as i64;
        if last & 0x80 != 0 {
            Ok(ScriptNumber(-value))
        } else {
            Ok(ScriptNumber(value))
        }
    }

    /// Minimal encoding
    pub fn to_bytes(&self) -> Vec<u8> {
        if self.0 == 0 {
            return Vec::new();
        }
        let negative = self.0 < 0;
        let mut abs = self.0.unsigned_abs();
        let mut out = Vec::with_capacity(9);
        while abs > 0 {
            out.push((abs & 0xff) as u8);
            abs >>= 8;
        }
        let last = out.len() - 1;
        if out[last] & 0x80 != 0 {
            out.push(if negative { 0x80 } else { 0x00 });
        } else if negative {
            out[last] |= 0x80;
        }
        out
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn checked_add(self, rhs: ScriptNumber) -> Result<ScriptNumber> {
        self.0
            .checked_add(rhs.0)
            .map(ScriptNumber)
            .ok_or(ConsensusError::ArithmeticOverflow)
    }

    pub fn checked_sub(self, rhs: ScriptNumber) -> Result<ScriptNumber> {
        self.0
            .checked_sub(rhs.0)
            .map(ScriptNumber)
            .ok_or(ConsensusError::ArithmeticOverflow)
    }
}

impl From<i64> for ScriptNumber {
    fn from(v: i64) -> Self {
        ScriptNumber(v)
    }
}

impl fmt::Display for ScriptNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Boolean coercion of a stack item
pub fn cast_to_bool(bytes: &[u8]) -> bool {
    for (i, &b) in bytes.iter().enumerate() {
        if b != 0 {
            // Negative zero
            return !(i == bytes.len() - 1 && b == 0x80);
        }
    }
    false
}

/// Flip the sign bit of a raw encoded number in place
pub fn negate_raw(bytes: &mut [u8]) {
    if let Some(last) = bytes.last_mut() {
        *last ^= 0x80;
    }
}

/// Clear the sign bit of a raw encoded number in place
pub fn abs_raw(bytes: &mut [u8]) {
    if let Some(last) = bytes.last_mut() {
        *last &= 0x7f;
    }
}
