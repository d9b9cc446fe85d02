//! Script opcode constants, canonical names and the dispatch descriptor table
//!
//! Every byte value has a descriptor. Named opcodes keep their canonical
//! `OP_*` name; direct pushes and unassigned bytes render as `0x%02x`.

use std::borrow::Cow;

// ============================================================================
// PUSH DATA / PUSH VALUE (0x00 - 0x60)
// ============================================================================

pub const OP_0: u8 = 0x00;
pub const OP_FALSE: u8 = OP_0;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_RESERVED: u8 = 0x50;
pub const OP_1: u8 = 0x51;
pub const OP_TRUE: u8 = OP_1;
pub const OP_2: u8 = 0x52;
pub const OP_3: u8 = 0x53;
pub const OP_4: u8 = 0x54;
pub const OP_5: u8 = 0x55;
pub const OP_6: u8 = 0x56;
pub const OP_7: u8 = 0x57;
pub const OP_8: u8 = 0x58;
pub const OP_9: u8 = 0x59;
pub const OP_10: u8 = 0x5a;
pub const OP_11: u8 = 0x5b;
pub const OP_12: u8 = 0x5c;
pub const OP_13: u8 = 0x5d;
pub const OP_14: u8 = 0x5e;
pub const OP_15: u8 = 0x5f;
pub const OP_16: u8 = 0x60;

// ============================================================================
// CONTROL FLOW (0x61 - 0x6a)
// ============================================================================

pub const OP_NOP: u8 = 0x61;
pub const OP_VER: u8 = 0x62;
pub const OP_IF: u8 = 0x63;
pub const OP_NOTIF: u8 = 0x64;
pub const OP_VERIF: u8 = 0x65;
pub const OP_VERNOTIF: u8 = 0x66;
pub const OP_ELSE: u8 = 0x67;
pub const OP_ENDIF: u8 = 0x68;
pub const OP_VERIFY: u8 = 0x69;
pub const OP_RETURN: u8 = 0x6a;

// ============================================================================
// STACK OPERATIONS (0x6b - 0x7d)
// ============================================================================

pub const OP_TOALTSTACK: u8 = 0x6b;
pub const OP_FROMALTSTACK: u8 = 0x6c;
pub const OP_2DROP: u8 = 0x6d;
pub const OP_2DUP: u8 = 0x6e;
pub const OP_3DUP: u8 = 0x6f;
pub const OP_2OVER: u8 = 0x70;
pub const OP_2ROT: u8 = 0x71;
pub const OP_2SWAP: u8 = 0x72;
pub const OP_IFDUP: u8 = 0x73;
pub const OP_DEPTH: u8 = 0x74;
pub const OP_DROP: u8 = 0x75;
pub const OP_DUP: u8 = 0x76;
pub const OP_NIP: u8 = 0x77;
pub const OP_OVER: u8 = 0x78;
pub const OP_PICK: u8 = 0x79;
pub const OP_ROLL: u8 = 0x7a;
pub const OP_ROT: u8 = 0x7b;
pub const OP_SWAP: u8 = 0x7c;
pub const OP_TUCK: u8 = 0x7d;

// ============================================================================
// SPLICE (0x7e - 0x82)
// ============================================================================

pub const OP_CAT: u8 = 0x7e;
pub const OP_SUBSTR: u8 = 0x7f;
pub const OP_LEFT: u8 = 0x80;
pub const OP_RIGHT: u8 = 0x81;
pub const OP_SIZE: u8 = 0x82;

// ============================================================================
// BITWISE LOGIC (0x83 - 0x8a)
// ============================================================================

pub const OP_INVERT: u8 = 0x83;
pub const OP_AND: u8 = 0x84;
pub const OP_OR: u8 = 0x85;
pub const OP_XOR: u8 = 0x86;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_RESERVED1: u8 = 0x89;
pub const OP_RESERVED2: u8 = 0x8a;

// ============================================================================
// ARITHMETIC (0x8b - 0xa5)
// ============================================================================

pub const OP_1ADD: u8 = 0x8b;
pub const OP_1SUB: u8 = 0x8c;
pub const OP_2MUL: u8 = 0x8d;
pub const OP_2DIV: u8 = 0x8e;
pub const OP_NEGATE: u8 = 0x8f;
pub const OP_ABS: u8 = 0x90;
pub const OP_NOT: u8 = 0x91;
pub const OP_0NOTEQUAL: u8 = 0x92;
pub const OP_ADD: u8 = 0x93;
pub const OP_SUB: u8 = 0x94;
pub const OP_MUL: u8 = 0x95;
pub const OP_DIV: u8 = 0x96;
pub const OP_MOD: u8 = 0x97;
pub const OP_LSHIFT: u8 = 0x98;
pub const OP_RSHIFT: u8 = 0x99;
pub const OP_BOOLAND: u8 = 0x9a;
pub const OP_BOOLOR: u8 = 0x9b;
pub const OP_NUMEQUAL: u8 = 0x9c;
pub const OP_NUMEQUALVERIFY: u8 = 0x9d;
pub const OP_NUMNOTEQUAL: u8 = 0x9e;
pub const OP_LESSTHAN: u8 = 0x9f;
pub const OP_GREATERTHAN: u8 = 0xa0;
pub const OP_LESSTHANOREQUAL: u8 = 0xa1;
pub const OP_GREATERTHANOREQUAL: u8 = 0xa2;
pub const OP_MIN: u8 = 0xa3;
pub const OP_MAX: u8 = 0xa4;
pub const OP_WITHIN: u8 = 0xa5;

// ============================================================================
// CRYPTO (0xa6 - 0xaf)
// ============================================================================

pub const OP_RIPEMD160: u8 = 0xa6;
pub const OP_SHA1: u8 = 0xa7;
pub const OP_SHA256: u8 = 0xa8;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_HASH256: u8 = 0xaa;
pub const OP_CODESEPARATOR: u8 = 0xab;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKSIGVERIFY: u8 = 0xad;
pub const OP_CHECKMULTISIG: u8 = 0xae;
pub const OP_CHECKMULTISIGVERIFY: u8 = 0xaf;

// ============================================================================
// EXPANSION (0xb0 - 0xb9)
// ============================================================================

pub const OP_NOP1: u8 = 0xb0;
pub const OP_CHECKLOCKTIMEVERIFY: u8 = 0xb1;
pub const OP_NOP2: u8 = OP_CHECKLOCKTIMEVERIFY;
pub const OP_CHECKSEQUENCEVERIFY: u8 = 0xb2;
pub const OP_NOP3: u8 = OP_CHECKSEQUENCEVERIFY;
pub const OP_NOP4: u8 = 0xb3;
pub const OP_NOP5: u8 = 0xb4;
pub const OP_NOP6: u8 = 0xb5;
pub const OP_NOP7: u8 = 0xb6;
pub const OP_NOP8: u8 = 0xb7;
pub const OP_NOP9: u8 = 0xb8;
pub const OP_NOP10: u8 = 0xb9;

// ============================================================================
// TEMPLATE MATCHING PLACEHOLDERS AND INVALID (0xfa - 0xff)
// ============================================================================

pub const OP_SMALLINTEGER: u8 = 0xfa;
pub const OP_PUBKEYS: u8 = 0xfb;
pub const OP_PUBKEYHASH: u8 = 0xfd;
pub const OP_PUBKEY: u8 = 0xfe;
pub const OP_INVALIDOPCODE: u8 = 0xff;

/// Which handler an opcode is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCategory {
    Constant,
    Flow,
    Stack,
    Splice,
    Bitwise,
    Arithmetic,
    Crypto,
    /// Branching, signature and locktime opcodes
    Unimplemented,
    /// Disabled by the reference implementation
    Disabled,
    /// Reserved and template placeholder values
    Reserved,
    Unassigned,
}

impl OpCategory {
    pub fn label(&self) -> &'static str {
        match self {
            OpCategory::Constant => "Constants",
            OpCategory::Flow => "Flow control",
            OpCategory::Stack => "Stack",
            OpCategory::Splice => "Splice",
            OpCategory::Bitwise => "Bitwise logic",
            OpCategory::Arithmetic => "Arithmetic",
            OpCategory::Crypto => "Crypto",
            OpCategory::Unimplemented => "Unimplemented",
            OpCategory::Disabled => "Disabled",
            OpCategory::Reserved => "Reserved",
            OpCategory::Unassigned => "Unassigned",
        }
    }
}

/// Descriptor for one byte value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub code: u8,
    pub name: Option<&'static str>,
    pub category: OpCategory,
}

impl OpcodeInfo {
    /// Canonical name, or `0x%02x` for unnamed bytes
    pub fn display_name(&self) -> Cow<'static, str> {
        match self.name {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("0x{:02x}", self.code)),
        }
    }

    /// Opcodes that push data and do not count toward the operation limit
    pub fn is_push(&self) -> bool {
        self.code <= OP_16
    }
}

pub static OPCODE_TABLE: [OpcodeInfo; 256] = build_table();

pub fn opcode_info(opcode: u8) -> &'static OpcodeInfo {
    &OPCODE_TABLE[opcode as usize]
}

pub fn opcode_name(opcode: u8) -> Cow<'static, str> {
    opcode_info(opcode).display_name()
}

const fn build_table() -> [OpcodeInfo; 256] {
    let mut table = [OpcodeInfo { code: 0, name: None, category: OpCategory::Unassigned }; 256];
    let mut i = 0;
    while i < 256 {
        let (name, category) = classify(i as u8);
        table[i] = OpcodeInfo { code: i as u8, name, category };
        i += 1;
    }
    table
}

const fn classify(op: u8) -> (Option<&'static str>, OpCategory) {
    use OpCategory::*;
    match op {
        OP_0 => (Some("OP_0"), Constant),
        0x01..=0x4b => (None, Constant),
        OP_PUSHDATA1 => (Some("OP_PUSHDATA1"), Constant),
        OP_PUSHDATA2 => (Some("OP_PUSHDATA2"), Constant),
        OP_PUSHDATA4 => (Some("OP_PUSHDATA4"), Constant),
        OP_1NEGATE => (Some("OP_1NEGATE"), Constant),
        OP_RESERVED => (Some("OP_RESERVED"), Reserved),
        OP_1 => (Some("OP_1"), Constant),
        OP_2 => (Some("OP_2"), Constant),
        OP_3 => (Some("OP_3"), Constant),
        OP_4 => (Some("OP_4"), Constant),
        OP_5 => (Some("OP_5"), Constant),
        OP_6 => (Some("OP_6"), Constant),
        OP_7 => (Some("OP_7"), Constant),
        OP_8 => (Some("OP_8"), Constant),
        OP_9 => (Some("OP_9"), Constant),
        OP_10 => (Some("OP_10"), Constant),
        OP_11 => (Some("OP_11"), Constant),
        OP_12 => (Some("OP_12"), Constant),
        OP_13 => (Some("OP_13"), Constant),
        OP_14 => (Some("OP_14"), Constant),
        OP_15 => (Some("OP_15"), Constant),
        OP_16 => (Some("OP_16"), Constant),

        OP_NOP => (Some("OP_NOP"), Flow),
        OP_VER => (Some("OP_VER"), Reserved),
        OP_IF => (Some("OP_IF"), Unimplemented),
        OP_NOTIF => (Some("OP_NOTIF"), Unimplemented),
        OP_VERIF => (Some("OP_VERIF"), Unimplemented),
        OP_VERNOTIF => (Some("OP_VERNOTIF"), Unimplemented),
        OP_ELSE => (Some("OP_ELSE"), Unimplemented),
        OP_ENDIF => (Some("OP_ENDIF"), Unimplemented),
        OP_VERIFY => (Some("OP_VERIFY"), Flow),
        OP_RETURN => (Some("OP_RETURN"), Flow),

        OP_TOALTSTACK => (Some("OP_TOALTSTACK"), Stack),
        OP_FROMALTSTACK => (Some("OP_FROMALTSTACK"), Stack),
        OP_2DROP => (Some("OP_2DROP"), Stack),
        OP_2DUP => (Some("OP_2DUP"), Stack),
        OP_3DUP => (Some("OP_3DUP"), Stack),
        OP_2OVER => (Some("OP_2OVER"), Stack),
        OP_2ROT => (Some("OP_2ROT"), Stack),
        OP_2SWAP => (Some("OP_2SWAP"), Stack),
        OP_IFDUP => (Some("OP_IFDUP"), Stack),
        OP_DEPTH => (Some("OP_DEPTH"), Stack),
        OP_DROP => (Some("OP_DROP"), Stack),
        OP_DUP => (Some("OP_DUP"), Stack),
        OP_NIP => (Some("OP_NIP"), Stack),
        OP_OVER => (Some("OP_OVER"), Stack),
        OP_PICK => (Some("OP_PICK"), Stack),
        OP_ROLL => (Some("OP_ROLL"), Stack),
        OP_ROT => (Some("OP_ROT"), Stack),
        OP_SWAP => (Some("OP_SWAP"), Stack),
        OP_TUCK => (Some("OP_TUCK"), Stack),

        OP_CAT => (Some("OP_CAT"), Disabled),
        OP_SUBSTR => (Some("OP_SUBSTR"), Disabled),
        OP_LEFT => (Some("OP_LEFT"), Disabled),
        OP_RIGHT => (Some("OP_RIGHT"), Disabled),
        OP_SIZE => (Some("OP_SIZE"), Splice),

        OP_INVERT => (Some("OP_INVERT"), Disabled),
        OP_AND => (Some("OP_AND"), Disabled),
        OP_OR => (Some("OP_OR"), Disabled),
        OP_XOR => (Some("OP_XOR"), Disabled),
        OP_EQUAL => (Some("OP_EQUAL"), Bitwise),
        OP_EQUALVERIFY => (Some("OP_EQUALVERIFY"), Bitwise),
        OP_RESERVED1 => (Some("OP_RESERVED1"), Reserved),
        OP_RESERVED2 => (Some("OP_RESERVED2"), Reserved),

        OP_1ADD => (Some("OP_1ADD"), Arithmetic),
        OP_1SUB => (Some("OP_1SUB"), Arithmetic),
        OP_2MUL => (Some("OP_2MUL"), Disabled),
        OP_2DIV => (Some("OP_2DIV"), Disabled),
        OP_NEGATE => (Some("OP_NEGATE"), Arithmetic),
        OP_ABS => (Some("OP_ABS"), Arithmetic),
        OP_NOT => (Some("OP_NOT"), Arithmetic),
        OP_0NOTEQUAL => (Some("OP_0NOTEQUAL"), Arithmetic),
        OP_ADD => (Some("OP_ADD"), Arithmetic),
        OP_SUB => (Some("OP_SUB"), Arithmetic),
        OP_MUL => (Some("OP_MUL"), Disabled),
        OP_DIV => (Some("OP_DIV"), Disabled),
        OP_MOD => (Some("OP_MOD"), Disabled),
        OP_LSHIFT => (Some("OP_LSHIFT"), Disabled),
        OP_RSHIFT => (Some("OP_RSHIFT"), Disabled),
        OP_BOOLAND => (Some("OP_BOOLAND"), Arithmetic),
        OP_BOOLOR => (Some("OP_BOOLOR"), Arithmetic),
        OP_NUMEQUAL => (Some("OP_NUMEQUAL"), Arithmetic),
        OP_NUMEQUALVERIFY => (Some("OP_NUMEQUALVERIFY"), Arithmetic),
        OP_NUMNOTEQUAL => (Some("OP_NUMNOTEQUAL"), Arithmetic),
        OP_LESSTHAN => (Some("OP_LESSTHAN"), Arithmetic),
        OP_GREATERTHAN => (Some("OP_GREATERTHAN"), Arithmetic),
        OP_LESSTHANOREQUAL => (Some("OP_LESSTHANOREQUAL"), Arithmetic),
        OP_GREATERTHANOREQUAL => (Some("OP_GREATERTHANOREQUAL"), Arithmetic),
        OP_MIN => (Some("OP_MIN"), Arithmetic),
        OP_MAX => (Some("OP_MAX"), Arithmetic),
        OP_WITHIN => (Some("OP_WITHIN"), Arithmetic),

        OP_RIPEMD160 => (Some("OP_RIPEMD160"), Crypto),
        OP_SHA1 => (Some("OP_SHA1"), Crypto),
        OP_SHA256 => (Some("OP_SHA256"), Crypto),
        OP_HASH160 => (Some("OP_HASH160"), Crypto),
        OP_HASH256 => (Some("OP_HASH256"), Crypto),
        OP_CODESEPARATOR => (Some("OP_CODESEPARATOR"), Crypto),
        OP_CHECKSIG => (Some("OP_CHECKSIG"), Unimplemented),
        OP_CHECKSIGVERIFY => (Some("OP_CHECKSIGVERIFY"), Unimplemented),
        OP_CHECKMULTISIG => (Some("OP_CHECKMULTISIG"), Unimplemented),
        OP_CHECKMULTISIGVERIFY => (Some("OP_CHECKMULTISIGVERIFY"), Unimplemented),

        OP_NOP1 => (Some("OP_NOP1"), Flow),
        OP_CHECKLOCKTIMEVERIFY => (Some("OP_CHECKLOCKTIMEVERIFY"), Unimplemented),
        OP_CHECKSEQUENCEVERIFY => (Some("OP_CHECKSEQUENCEVERIFY"), Unimplemented),
        OP_NOP4 => (Some("OP_NOP4"), Flow),
        OP_NOP5 => (Some("OP_NOP5"), Flow),
        OP_NOP6 => (Some("OP_NOP6"), Flow),
        OP_NOP7 => (Some("OP_NOP7"), Flow),
        OP_NOP8 => (Some("OP_NOP8"), Flow),
        OP_NOP9 => (Some("OP_NOP9"), Flow),
        OP_NOP10 => (Some("OP_NOP10"), Flow),

        OP_SMALLINTEGER => (Some("OP_SMALLINTEGER"), Reserved),
        OP_PUBKEYS => (Some("OP_PUBKEYS"), Reserved),
        OP_PUBKEYHASH => (Some("OP_PUBKEYHASH"), Reserved),
        OP_PUBKEY => (Some("OP_PUBKEY"), Reserved),
        OP_INVALIDOPCODE => (Some("OP_INVALIDOPCODE"), Reserved),

        _ => (None, Unassigned),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_names() {
        assert_eq!(opcode_name(0x76), "OP_DUP");
        assert_eq!(opcode_name(0x87), "OP_EQUAL");
        assert_eq!(opcode_name(OP_0), "OP_0");
        assert_eq!(opcode_name(OP_16), "OP_16");
        assert_eq!(opcode_name(0xb1), "OP_CHECKLOCKTIMEVERIFY");
        assert_eq!(opcode_name(0xb2), "OP_CHECKSEQUENCEVERIFY");
        assert_eq!(opcode_name(0xff), "OP_INVALIDOPCODE");
        assert_eq!(opcode_name(0xfd), "OP_PUBKEYHASH");
    }

    #[test]
    fn test_fallback_hex_names() {
        assert_eq!(opcode_name(0x01), "0x01");
        assert_eq!(opcode_name(0x4b), "0x4b");
        assert_eq!(opcode_name(0xba), "0xba");
        assert_eq!(opcode_name(0xfc), "0xfc");
    }

    #[test]
    fn test_table_codes_match_index() {
        for (i, info) in OPCODE_TABLE.iter().enumerate() {
            assert_eq!(info.code as usize, i);
        }
    }

    #[test]
    fn test_categories() {
        assert_eq!(opcode_info(0x20).category, OpCategory::Constant);
        assert_eq!(opcode_info(OP_DUP).category, OpCategory::Stack);
        assert_eq!(opcode_info(OP_SIZE).category, OpCategory::Splice);
        assert_eq!(opcode_info(OP_EQUALVERIFY).category, OpCategory::Bitwise);
        assert_eq!(opcode_info(OP_WITHIN).category, OpCategory::Arithmetic);
        assert_eq!(opcode_info(OP_IF).category, OpCategory::Unimplemented);
        assert_eq!(opcode_info(OP_CHECKSIG).category, OpCategory::Unimplemented);
        assert_eq!(opcode_info(OP_CAT).category, OpCategory::Disabled);
        assert_eq!(opcode_info(0xc0).category, OpCategory::Unassigned);
    }

    #[test]
    fn test_named_opcode_count() {
        let named = OPCODE_TABLE.iter().filter(|i| i.name.is_some()).count();
        // OP_0, every byte in 0x4c..=0xb9, and the five template/invalid values
        assert_eq!(named, 1 + (0xb9 - 0x4c + 1) + 5);
    }
}
