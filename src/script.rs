//! Script interpreter
//!
//! Scripts run linearly against two capacity-bounded stacks. Every byte is
//! looked up in [`OPCODE_TABLE`] and routed to the handler for its category;
//! each handler rejects opcodes outside its own set with
//! [`ConsensusError::UnrecognizedOpcode`].

use crate::config::ScriptLimits;
use crate::error::{ConsensusError, Result};
use crate::hash::{double_sha256, hash160, ripemd160, sha1, sha256};
use crate::opcodes::*;
use crate::script_num::{abs_raw, cast_to_bool, negate_raw, ScriptNumber};
use crate::stack::Stack;
use log::{debug, trace};

/// Header width and data length of a push opcode, checked against `rest`.
///
/// Returns `None` for opcodes that carry no inline data.
fn push_extent(op: u8, rest: &[u8]) -> Result<Option<(usize, usize)>> {
    let (header, len) = match op {
        0x01..=0x4b => (0, op as usize),
        OP_PUSHDATA1 => (1, le_prefix(rest, 1)?),
        OP_PUSHDATA2 => (2, le_prefix(rest, 2)?),
        OP_PUSHDATA4 => (4, le_prefix(rest, 4)?),
        _ => return Ok(None),
    };
    if len > rest.len() - header {
        return Err(ConsensusError::Truncated(format!(
            "{} pushes {} bytes, {} remain",
            opcode_name(op),
            len,
            rest.len() - header
        )));
    }
    Ok(Some((header, len)))
}

fn le_prefix(rest: &[u8], width: usize) -> Result<usize> {
    let bytes = rest.get(..width).ok_or_else(|| {
        ConsensusError::Truncated(format!("push length needs {} bytes, {} remain", width, rest.len()))
    })?;
    Ok(bytes.iter().rev().fold(0usize, |acc, &b| (acc << 8) | b as usize))
}

fn number(item: &[u8], max_num_len: usize) -> Result<ScriptNumber> {
    ScriptNumber::from_bytes_limited(item, max_num_len)
}

/// Pop an index operand for PICK/ROLL and check it against the remaining depth
fn pop_index(main: &mut Stack, max_num_len: usize) -> Result<usize> {
    let n = number(&main.pop()?, max_num_len)?.value();
    if n < 0 || n as u64 >= main.len() as u64 {
        return Err(ConsensusError::InvalidStackIndex(n));
    }
    Ok(n as usize)
}

/// Push-value opcodes.
///
/// `rest` is the script after the opcode byte; returns how many of its bytes
/// the push consumed.
pub fn op_constants(op: u8, rest: &[u8], main: &mut Stack, max_element_size: usize) -> Result<usize> {
    if let Some((header, len)) = push_extent(op, rest)? {
        if len > max_element_size {
            return Err(ConsensusError::LimitExceeded(format!(
                "push of {} bytes exceeds {} byte element limit",
                len, max_element_size
            )));
        }
        main.push(rest[header..header + len].to_vec())?;
        return Ok(header + len);
    }

    match op {
        OP_0 => main.push(Vec::new())?,
        OP_1NEGATE => main.push(ScriptNumber(-1).to_bytes())?,
        OP_1..=OP_16 => main.push_byte(op - (OP_1 - 1))?,
        _ => {
            return Err(ConsensusError::UnrecognizedOpcode {
                opcode: op,
                category: OpCategory::Constant.label(),
            })
        }
    }
    Ok(0)
}

pub fn op_flow(op: u8, main: &mut Stack) -> Result<()> {
    match op {
        OP_NOP | OP_NOP1 | OP_NOP4..=OP_NOP10 => Ok(()),
        OP_VERIFY => {
            if !cast_to_bool(&main.pop()?) {
                return Err(ConsensusError::ScriptInvalid("OP_VERIFY failed".to_string()));
            }
            Ok(())
        }
        OP_RETURN => Err(ConsensusError::ScriptInvalid("OP_RETURN executed".to_string())),
        _ => Err(ConsensusError::UnrecognizedOpcode {
            opcode: op,
            category: OpCategory::Flow.label(),
        }),
    }
}

/// Stack manipulation; PICK/ROLL indices are ScriptNumbers of at most `max_num_len` bytes
pub fn op_stack(op: u8, main: &mut Stack, alt: &mut Stack, max_num_len: usize) -> Result<()> {
    match op {
        OP_TOALTSTACK => alt.push(main.pop()?),
        OP_FROMALTSTACK => main.push(alt.pop()?),
        OP_2DROP => {
            main.require(2)?;
            main.pop()?;
            main.pop()?;
            Ok(())
        }
        OP_2DUP => {
            main.require(2)?;
            let x1 = main.peek(1)?.clone();
            let x2 = main.peek(0)?.clone();
            main.push(x1)?;
            main.push(x2)
        }
        OP_3DUP => {
            main.require(3)?;
            let x1 = main.peek(2)?.clone();
            let x2 = main.peek(1)?.clone();
            let x3 = main.peek(0)?.clone();
            main.push(x1)?;
            main.push(x2)?;
            main.push(x3)
        }
        OP_2OVER => {
            main.require(4)?;
            let x1 = main.peek(3)?.clone();
            let x2 = main.peek(2)?.clone();
            main.push(x1)?;
            main.push(x2)
        }
        OP_2ROT => {
            // x1 x2 x3 x4 x5 x6 -> x3 x4 x5 x6 x1 x2
            main.require(6)?;
            let x1 = main.remove(5)?;
            let x2 = main.remove(4)?;
            main.push(x1)?;
            main.push(x2)
        }
        OP_2SWAP => {
            // x1 x2 x3 x4 -> x3 x4 x1 x2
            main.require(4)?;
            let x1 = main.remove(3)?;
            let x2 = main.remove(2)?;
            main.push(x1)?;
            main.push(x2)
        }
        OP_IFDUP => {
            let top = main.top()?;
            if cast_to_bool(top) {
                let copy = top.clone();
                main.push(copy)?;
            }
            Ok(())
        }
        OP_DEPTH => {
            let depth = ScriptNumber(main.len() as i64);
            main.push(depth.to_bytes())
        }
        OP_DROP => main.pop().map(drop),
        OP_DUP => {
            let copy = main.top()?.clone();
            main.push(copy)
        }
        OP_NIP => main.remove(1).map(drop),
        OP_OVER => {
            main.require(2)?;
            let top = main.pop()?;
            let second = main.top()?.clone();
            main.push(top)?;
            main.push(second)
        }
        OP_PICK => {
            let n = pop_index(main, max_num_len)?;
            let copy = main.peek(n)?.clone();
            main.push(copy)
        }
        OP_ROLL => {
            let n = pop_index(main, max_num_len)?;
            let item = main.remove(n)?;
            main.push(item)
        }
        OP_ROT => {
            // x1 x2 x3 -> x2 x3 x1
            main.require(3)?;
            let x1 = main.remove(2)?;
            main.push(x1)
        }
        OP_SWAP => {
            main.require(2)?;
            let x1 = main.remove(1)?;
            main.push(x1)
        }
        OP_TUCK => {
            // x1 x2 -> x2 x1 x2
            main.require(2)?;
            let x2 = main.pop()?;
            let x1 = main.pop()?;
            main.push(x2.clone())?;
            main.push(x1)?;
            main.push(x2)
        }
        _ => Err(ConsensusError::UnrecognizedOpcode {
            opcode: op,
            category: OpCategory::Stack.label(),
        }),
    }
}

pub fn op_splice(op: u8, main: &mut Stack) -> Result<()> {
    match op {
        OP_SIZE => {
            let size = ScriptNumber(main.top()?.len() as i64);
            main.push(size.to_bytes())
        }
        _ => Err(ConsensusError::UnrecognizedOpcode {
            opcode: op,
            category: OpCategory::Splice.label(),
        }),
    }
}

pub fn op_bitwise(op: u8, main: &mut Stack) -> Result<()> {
    match op {
        OP_EQUAL | OP_EQUALVERIFY => {
            main.require(2)?;
            let b = main.pop()?;
            let a = main.pop()?;
            if op == OP_EQUAL {
                return main.push_bool(a == b);
            }
            if a != b {
                return Err(ConsensusError::ScriptInvalid(format!(
                    "OP_EQUALVERIFY failed: {} != {}",
                    hex::encode(&a),
                    hex::encode(&b)
                )));
            }
            Ok(())
        }
        _ => Err(ConsensusError::UnrecognizedOpcode {
            opcode: op,
            category: OpCategory::Bitwise.label(),
        }),
    }
}

/// Numeric opcodes over ScriptNumbers no longer than `max_num_len` bytes
pub fn op_arithmetic(op: u8, main: &mut Stack, max_num_len: usize) -> Result<()> {
    match op {
        OP_NEGATE | OP_ABS => {
            let mut item = main.pop()?;
            number(&item, max_num_len)?;
            if op == OP_NEGATE {
                negate_raw(&mut item);
            } else {
                abs_raw(&mut item);
            }
            main.push(item)
        }
        OP_1ADD | OP_1SUB | OP_NOT | OP_0NOTEQUAL => {
            let n = number(&main.pop()?, max_num_len)?;
            match op {
                OP_1ADD => main.push(n.checked_add(ScriptNumber(1))?.to_bytes()),
                OP_1SUB => main.push(n.checked_sub(ScriptNumber(1))?.to_bytes()),
                OP_NOT => main.push_bool(n.value() == 0),
                _ => main.push_bool(n.value() != 0),
            }
        }
        OP_BOOLAND | OP_BOOLOR => {
            main.require(2)?;
            let b = cast_to_bool(&main.pop()?);
            let a = cast_to_bool(&main.pop()?);
            main.push_bool(if op == OP_BOOLAND { a && b } else { a || b })
        }
        OP_ADD | OP_SUB | OP_NUMEQUAL | OP_NUMEQUALVERIFY | OP_NUMNOTEQUAL | OP_LESSTHAN
        | OP_GREATERTHAN | OP_LESSTHANOREQUAL | OP_GREATERTHANOREQUAL | OP_MIN | OP_MAX => {
            main.require(2)?;
            let b = number(&main.pop()?, max_num_len)?;
            let a = number(&main.pop()?, max_num_len)?;
            match op {
                OP_ADD => main.push(a.checked_add(b)?.to_bytes()),
                OP_SUB => main.push(a.checked_sub(b)?.to_bytes()),
                OP_NUMEQUAL => main.push_bool(a == b),
                OP_NUMEQUALVERIFY => {
                    if a != b {
                        return Err(ConsensusError::ScriptInvalid(format!(
                            "OP_NUMEQUALVERIFY failed: {} != {}",
                            a, b
                        )));
                    }
                    Ok(())
                }
                OP_NUMNOTEQUAL => main.push_bool(a != b),
                OP_LESSTHAN => main.push_bool(a < b),
                OP_GREATERTHAN => main.push_bool(a > b),
                OP_LESSTHANOREQUAL => main.push_bool(a <= b),
                OP_GREATERTHANOREQUAL => main.push_bool(a >= b),
                OP_MIN => main.push(a.min(b).to_bytes()),
                _ => main.push(a.max(b).to_bytes()),
            }
        }
        OP_WITHIN => {
            main.require(3)?;
            let max = number(&main.pop()?, max_num_len)?;
            let min = number(&main.pop()?, max_num_len)?;
            let x = number(&main.pop()?, max_num_len)?;
            main.push_bool(min <= x && x < max)
        }
        _ => Err(ConsensusError::UnrecognizedOpcode {
            opcode: op,
            category: OpCategory::Arithmetic.label(),
        }),
    }
}

pub fn op_crypto(op: u8, main: &mut Stack) -> Result<()> {
    let digest: Vec<u8> = match op {
        OP_CODESEPARATOR => return Ok(()),
        OP_RIPEMD160 => ripemd160(&main.pop()?).to_vec(),
        OP_SHA1 => sha1(&main.pop()?).to_vec(),
        OP_SHA256 => sha256(&main.pop()?).to_vec(),
        OP_HASH160 => hash160(&main.pop()?).to_vec(),
        OP_HASH256 => double_sha256(&main.pop()?).to_vec(),
        _ => {
            return Err(ConsensusError::UnrecognizedOpcode {
                opcode: op,
                category: OpCategory::Crypto.label(),
            })
        }
    };
    main.push(digest)
}

/// Dual-stack machine that executes scripts one opcode at a time.
///
/// The main stack persists across [`execute`](ScriptMachine::execute) calls so
/// a signature script and a public key script can share it. Each call starts
/// with an empty alt stack.
#[derive(Debug, Clone)]
pub struct ScriptMachine {
    main: Stack,
    alt: Stack,
    limits: ScriptLimits,
}

impl Default for ScriptMachine {
    fn default() -> Self {
        ScriptMachine::new(ScriptLimits::default())
    }
}

impl ScriptMachine {
    pub fn new(limits: ScriptLimits) -> Self {
        ScriptMachine {
            main: Stack::with_capacity_limit(limits.max_stack_size),
            alt: Stack::with_capacity_limit(limits.max_stack_size),
            limits,
        }
    }

    pub fn main(&self) -> &Stack {
        &self.main
    }

    pub fn alt(&self) -> &Stack {
        &self.alt
    }

    pub fn limits(&self) -> &ScriptLimits {
        &self.limits
    }

    /// Empty both stacks
    pub fn reset(&mut self) {
        self.main.clear();
        self.alt.clear();
    }

    /// True when the main stack's top item coerces to true
    pub fn top_is_true(&self) -> bool {
        self.main.top().map_or(false, |top| cast_to_bool(top))
    }

    /// Run `script` to completion or to the first failing opcode
    pub fn execute(&mut self, script: &[u8]) -> Result<()> {
        self.alt.clear();
        if script.len() > self.limits.max_script_size {
            return Err(ConsensusError::LimitExceeded(format!(
                "script of {} bytes exceeds {} byte limit",
                script.len(),
                self.limits.max_script_size
            )));
        }

        let mut op_count = 0usize;
        let mut pc = 0usize;
        while pc < script.len() {
            let op = script[pc];
            let info = opcode_info(op);
            trace!("{:5}: {} (stack depth {})", pc, info.display_name(), self.main.len());
            pc += 1;

            if !info.is_push() {
                op_count += 1;
                if op_count > self.limits.max_ops {
                    return Err(ConsensusError::LimitExceeded(format!(
                        "more than {} operations",
                        self.limits.max_ops
                    )));
                }
            }

            match info.category {
                OpCategory::Constant => {
                    pc += op_constants(op, &script[pc..], &mut self.main, self.limits.max_element_size)?;
                }
                OpCategory::Flow => op_flow(op, &mut self.main)?,
                OpCategory::Stack => op_stack(op, &mut self.main, &mut self.alt, self.limits.max_num_len)?,
                OpCategory::Splice => op_splice(op, &mut self.main)?,
                OpCategory::Bitwise => op_bitwise(op, &mut self.main)?,
                OpCategory::Arithmetic => op_arithmetic(op, &mut self.main, self.limits.max_num_len)?,
                OpCategory::Crypto => op_crypto(op, &mut self.main)?,
                OpCategory::Unimplemented => return Err(ConsensusError::NotImplemented { opcode: op }),
                OpCategory::Disabled => return Err(ConsensusError::DisabledOpcode { opcode: op }),
                OpCategory::Reserved | OpCategory::Unassigned => {
                    return Err(ConsensusError::UnrecognizedOpcode {
                        opcode: op,
                        category: info.category.label(),
                    })
                }
            }
        }
        Ok(())
    }
}

/// Execute a single script on fresh stacks
pub fn eval_script(script: &[u8], limits: ScriptLimits) -> Result<ScriptMachine> {
    let mut machine = ScriptMachine::new(limits);
    machine.execute(script)?;
    Ok(machine)
}

/// Run `script_sig` then `script_pubkey` on one main stack; the alt stack
/// does not carry over from one script to the next.
///
/// A script that runs and rejects yields `Ok(false)`; malformed scripts and
/// unimplemented opcodes are errors.
pub fn verify_script(script_sig: &[u8], script_pubkey: &[u8], limits: ScriptLimits) -> Result<bool> {
    let mut machine = ScriptMachine::new(limits);
    match machine.execute(script_sig).and_then(|()| machine.execute(script_pubkey)) {
        Ok(()) => Ok(machine.top_is_true()),
        Err(e) if e.is_script_failure() => {
            debug!("script rejected: {}", e);
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Render a script as space-separated opcode names, push data as hex
pub fn disassemble(script: &[u8]) -> Result<String> {
    let mut parts = Vec::new();
    let mut pc = 0usize;
    while pc < script.len() {
        let op = script[pc];
        pc += 1;
        match push_extent(op, &script[pc..])? {
            Some((header, len)) => {
                let data = &script[pc + header..pc + header + len];
                if op >= OP_PUSHDATA1 {
                    parts.push(opcode_name(op).into_owned());
                }
                if !data.is_empty() {
                    parts.push(hex::encode(data));
                }
                pc += header + len;
            }
            None => parts.push(opcode_name(op).into_owned()),
        }
    }
    Ok(parts.join(" "))
}
