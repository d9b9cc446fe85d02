//! Error types for block decoding and script execution

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsensusError {
    #[error("Bad block magic: found {found:02x?}")]
    BadMagic { found: [u8; 4] },

    #[error("Truncated stream: {0}")]
    Truncated(String),

    #[error("Block record length {declared} does not match {consumed} decoded bytes")]
    FrameMismatch { declared: usize, consumed: usize },

    #[error("Bad block index {index} (from {count} blocks)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("Stack underflow")]
    StackUnderflow,

    #[error("Stack overflow: capacity {capacity} exceeded")]
    StackOverflow { capacity: usize },

    #[error("Invalid stack index: {0}")]
    InvalidStackIndex(i64),

    #[error("0x{opcode:02x} not a Script {category} op")]
    UnrecognizedOpcode { opcode: u8, category: &'static str },

    #[error("Opcode 0x{opcode:02x} is not implemented")]
    NotImplemented { opcode: u8 },

    #[error("Opcode 0x{opcode:02x} is disabled")]
    DisabledOpcode { opcode: u8 },

    #[error("Script failed: {0}")]
    ScriptInvalid(String),

    #[error("Script number of {len} bytes exceeds {max} byte limit")]
    NumberTooLong { len: usize, max: usize },

    #[error("Script arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),
}

impl ConsensusError {
    /// True when the script ran and rejected, as opposed to being malformed.
    pub fn is_script_failure(&self) -> bool {
        matches!(self, ConsensusError::ScriptInvalid(_))
    }

    /// True for decode errors caused by running out of input.
    pub fn is_truncated(&self) -> bool {
        matches!(self, ConsensusError::Truncated(_))
    }
}

impl From<std::io::Error> for ConsensusError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            ConsensusError::Truncated(err.to_string())
        } else {
            ConsensusError::Io(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, ConsensusError>;
