//! Resource limits for the decoder and the interpreter
//!
//! Every field has a default, so a partial JSON document (or none at all)
//! yields a usable configuration.

use crate::constants::*;
use crate::error::{ConsensusError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Interpreter limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptLimits {
    pub max_script_size: usize,
    /// Per stack; the main and alt stacks are bounded separately
    pub max_stack_size: usize,
    pub max_element_size: usize,
    pub max_ops: usize,
    pub max_num_len: usize,
}

impl Default for ScriptLimits {
    fn default() -> Self {
        ScriptLimits {
            max_script_size: MAX_SCRIPT_SIZE,
            max_stack_size: MAX_STACK_SIZE,
            max_element_size: MAX_SCRIPT_ELEMENT_SIZE,
            max_ops: MAX_SCRIPT_OPS,
            max_num_len: MAX_SCRIPT_NUM_LEN,
        }
    }
}

/// Block file limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockLimits {
    pub max_record_size: usize,
}

impl Default for BlockLimits {
    fn default() -> Self {
        BlockLimits { max_record_size: MAX_RECORD_SIZE }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub script: ScriptLimits,
    pub block: BlockLimits,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)
            .map_err(|e| ConsensusError::Config(format!("invalid JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConsensusError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Override limits from `<PREFIX>_MAX_*` environment variables.
    ///
    /// Recognised suffixes: `MAX_SCRIPT_SIZE`, `MAX_STACK_SIZE`,
    /// `MAX_ELEMENT_SIZE`, `MAX_OPS`, `MAX_NUM_LEN`, `MAX_RECORD_SIZE`.
    pub fn apply_env_overrides(&mut self, prefix: &str) -> Result<()> {
        let fields: [(&str, &mut usize); 6] = [
            ("MAX_SCRIPT_SIZE", &mut self.script.max_script_size),
            ("MAX_STACK_SIZE", &mut self.script.max_stack_size),
            ("MAX_ELEMENT_SIZE", &mut self.script.max_element_size),
            ("MAX_OPS", &mut self.script.max_ops),
            ("MAX_NUM_LEN", &mut self.script.max_num_len),
            ("MAX_RECORD_SIZE", &mut self.block.max_record_size),
        ];
        for (suffix, field) in fields {
            let key = format!("{}_{}", prefix, suffix);
            if let Ok(value) = std::env::var(&key) {
                *field = value
                    .trim()
                    .parse()
                    .map_err(|e| ConsensusError::Config(format!("{}={:?}: {}", key, value, e)))?;
            }
        }
        self.validate()
    }

    /// Reject limits the interpreter cannot honour
    pub fn validate(&self) -> Result<()> {
        let s = &self.script;
        let limits = [
            ("max_script_size", s.max_script_size),
            ("max_stack_size", s.max_stack_size),
            ("max_element_size", s.max_element_size),
            ("max_ops", s.max_ops),
            ("max_num_len", s.max_num_len),
            ("max_record_size", self.block.max_record_size),
        ];
        if let Some((name, _)) = limits.iter().find(|(_, v)| *v == 0) {
            return Err(ConsensusError::Config(format!("{} must be non-zero", name)));
        }
        if s.max_num_len > MAX_SCRIPT_NUM_LEN {
            return Err(ConsensusError::Config(format!(
                "max_num_len {} exceeds {} bytes",
                s.max_num_len, MAX_SCRIPT_NUM_LEN
            )));
        }
        if self.block.max_record_size > u32::MAX as usize {
            return Err(ConsensusError::Config(format!(
                "max_record_size {} does not fit a 4-byte record length",
                self.block.max_record_size
            )));
        }
        Ok(())
    }
}
