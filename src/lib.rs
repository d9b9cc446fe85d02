//! # Blockscript
//!
//! Decoding of block-file containers and execution of transaction scripts.
//!
//! The crate has two cores that share hashing and compact integer encoding:
//!
//! - a binary codec for block records, block headers and transactions
//!   (`block_file`, `block`, `transaction`, `compact_int`)
//! - a dual-stack interpreter for the non-branching Script opcode set
//!   (`script`, `stack`, `opcodes`, `script_num`)
//!
//! ## Design Principles
//!
//! 1. **No silent truncation**: every short read is an error, never a partial value
//! 2. **Checked limits**: stack depth, element size, operation count and number
//!    width are bounded and reported as errors
//! 3. **Exact Version Pinning**: hashing dependencies pinned to exact versions
//!
//! ## Usage
//!
//! ```rust
//! use blockscript::script::{disassemble, verify_script};
//! use blockscript::config::ScriptLimits;
//! use blockscript::opcodes::*;
//!
//! let script_sig = vec![OP_2, OP_3];
//! let script_pubkey = vec![OP_ADD, OP_5, OP_EQUAL];
//! assert!(verify_script(&script_sig, &script_pubkey, ScriptLimits::default()).unwrap());
//! assert_eq!(disassemble(&script_pubkey).unwrap(), "OP_ADD OP_5 OP_EQUAL");
//! ```

pub mod block;
pub mod block_file;
pub mod compact_int;
pub mod config;
pub mod constants;
pub mod encode;
pub mod error;
pub mod hash;
pub mod opcodes;
pub mod script;
pub mod script_num;
pub mod stack;
pub mod transaction;
pub mod types;

// Re-export commonly used types
pub use block_file::BlockFile;
pub use config::{BlockLimits, Config, ScriptLimits};
pub use constants::*;
pub use encode::{Decodable, Encodable};
pub use error::{ConsensusError, Result};
pub use script::ScriptMachine;
pub use script_num::ScriptNumber;
pub use stack::Stack;
pub use types::*;
