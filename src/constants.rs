//! Wire-format and interpreter constants

/// Magic bytes framing every block record in a block file
pub const BLOCK_MAGIC: [u8; 4] = [0xf9, 0xbe, 0xb4, 0xd9];

/// Serialized block header size in bytes
pub const BLOCK_HEADER_SIZE: usize = 80;

/// Magic (4) + record length (4)
pub const RECORD_PREFIX_SIZE: u64 = 8;

/// Largest block record accepted from a file: 32 MiB
pub const MAX_RECORD_SIZE: usize = 32 * 1024 * 1024;

/// Largest script length prefix accepted while decoding a transaction
pub const MAX_SCRIPT_SIZE_ON_WIRE: usize = MAX_RECORD_SIZE;

/// Maximum script length
pub const MAX_SCRIPT_SIZE: usize = 10_000;

/// Maximum stack size during script execution
pub const MAX_STACK_SIZE: usize = 1000;

/// Maximum size of a single pushed stack element
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;

/// Maximum number of non-push operations in script
pub const MAX_SCRIPT_OPS: usize = 201;

/// Widest script number the interpreter will decode
pub const MAX_SCRIPT_NUM_LEN: usize = 8;

/// CompactInt discriminants
pub const COMPACT_U16: u8 = 0xfd;
pub const COMPACT_U32: u8 = 0xfe;
pub const COMPACT_U64: u8 = 0xff;

/// Sequence number for final transaction
pub const SEQUENCE_FINAL: u32 = 0xffffffff;
