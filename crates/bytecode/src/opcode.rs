//! EVM opcode constants and per-opcode metadata.

use primitives::SpecId;

/// Metadata of a single opcode: mnemonic, stack traffic, trailing immediate
/// bytes, whether it halts the frame, and the hardfork it was introduced in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpInfo {
    name: &'static str,
    inputs: u8,
    outputs: u8,
    immediate: u8,
    terminating: bool,
    since: SpecId,
}

impl OpInfo {
    /// Mnemonic of the opcode.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Stack words consumed.
    #[inline]
    pub const fn inputs(&self) -> u8 {
        self.inputs
    }

    /// Stack words produced.
    #[inline]
    pub const fn outputs(&self) -> u8 {
        self.outputs
    }

    /// Immediate bytes following the opcode in the bytecode.
    #[inline]
    pub const fn immediate_size(&self) -> u8 {
        self.immediate
    }

    /// Whether the opcode ends execution of the frame.
    #[inline]
    pub const fn is_terminating(&self) -> bool {
        self.terminating
    }

    /// First hardfork in which the opcode is defined.
    #[inline]
    pub const fn introduced_in(&self) -> SpecId {
        self.since
    }

    /// Whether the opcode is defined under the given hardfork.
    #[inline]
    pub const fn is_enabled_in(&self, spec: SpecId) -> bool {
        spec.is_enabled_in(self.since)
    }
}

macro_rules! opcodes {
    ($($val:literal => $name:ident ($inputs:expr, $outputs:expr, $imm:expr, $term:expr, $since:ident);)*) => {
        $(
            pub const $name: u8 = $val;
        )*

        /// Metadata table for all 256 opcode values. `None` marks bytes that
        /// are undefined in every hardfork.
        pub const OPCODE_INFO: [Option<OpInfo>; 256] = {
            let mut table: [Option<OpInfo>; 256] = [None; 256];
            $(
                table[$val as usize] = Some(OpInfo {
                    name: stringify!($name),
                    inputs: $inputs,
                    outputs: $outputs,
                    immediate: $imm,
                    terminating: $term,
                    since: SpecId::$since,
                });
            )*
            table
        };
    };
}

opcodes! {
    0x00 => STOP           (0, 0, 0, true,  FRONTIER);
    0x01 => ADD            (2, 1, 0, false, FRONTIER);
    0x02 => MUL            (2, 1, 0, false, FRONTIER);
    0x03 => SUB            (2, 1, 0, false, FRONTIER);
    0x04 => DIV            (2, 1, 0, false, FRONTIER);
    0x05 => SDIV           (2, 1, 0, false, FRONTIER);
    0x06 => MOD            (2, 1, 0, false, FRONTIER);
    0x07 => SMOD           (2, 1, 0, false, FRONTIER);
    0x08 => ADDMOD         (3, 1, 0, false, FRONTIER);
    0x09 => MULMOD         (3, 1, 0, false, FRONTIER);
    0x0a => EXP            (2, 1, 0, false, FRONTIER);
    0x0b => SIGNEXTEND     (2, 1, 0, false, FRONTIER);

    0x10 => LT             (2, 1, 0, false, FRONTIER);
    0x11 => GT             (2, 1, 0, false, FRONTIER);
    0x12 => SLT            (2, 1, 0, false, FRONTIER);
    0x13 => SGT            (2, 1, 0, false, FRONTIER);
    0x14 => EQ             (2, 1, 0, false, FRONTIER);
    0x15 => ISZERO         (1, 1, 0, false, FRONTIER);
    0x16 => AND            (2, 1, 0, false, FRONTIER);
    0x17 => OR             (2, 1, 0, false, FRONTIER);
    0x18 => XOR            (2, 1, 0, false, FRONTIER);
    0x19 => NOT            (1, 1, 0, false, FRONTIER);
    0x1a => BYTE           (2, 1, 0, false, FRONTIER);
    0x1b => SHL            (2, 1, 0, false, CONSTANTINOPLE);
    0x1c => SHR            (2, 1, 0, false, CONSTANTINOPLE);
    0x1d => SAR            (2, 1, 0, false, CONSTANTINOPLE);

    0x20 => KECCAK256      (2, 1, 0, false, FRONTIER);

    0x30 => ADDRESS        (0, 1, 0, false, FRONTIER);
    0x31 => BALANCE        (1, 1, 0, false, FRONTIER);
    0x32 => ORIGIN         (0, 1, 0, false, FRONTIER);
    0x33 => CALLER         (0, 1, 0, false, FRONTIER);
    0x34 => CALLVALUE      (0, 1, 0, false, FRONTIER);
    0x35 => CALLDATALOAD   (1, 1, 0, false, FRONTIER);
    0x36 => CALLDATASIZE   (0, 1, 0, false, FRONTIER);
    0x37 => CALLDATACOPY   (3, 0, 0, false, FRONTIER);
    0x38 => CODESIZE       (0, 1, 0, false, FRONTIER);
    0x39 => CODECOPY       (3, 0, 0, false, FRONTIER);
    0x3a => GASPRICE       (0, 1, 0, false, FRONTIER);
    0x3b => EXTCODESIZE    (1, 1, 0, false, FRONTIER);
    0x3c => EXTCODECOPY    (4, 0, 0, false, FRONTIER);
    0x3d => RETURNDATASIZE (0, 1, 0, false, BYZANTIUM);
    0x3e => RETURNDATACOPY (3, 0, 0, false, BYZANTIUM);
    0x3f => EXTCODEHASH    (1, 1, 0, false, CONSTANTINOPLE);

    0x40 => BLOCKHASH      (1, 1, 0, false, FRONTIER);
    0x41 => COINBASE       (0, 1, 0, false, FRONTIER);
    0x42 => TIMESTAMP      (0, 1, 0, false, FRONTIER);
    0x43 => NUMBER         (0, 1, 0, false, FRONTIER);
    0x44 => DIFFICULTY     (0, 1, 0, false, FRONTIER);
    0x45 => GASLIMIT       (0, 1, 0, false, FRONTIER);
    0x46 => CHAINID        (0, 1, 0, false, ISTANBUL);
    0x47 => SELFBALANCE    (0, 1, 0, false, ISTANBUL);
    0x48 => BASEFEE        (0, 1, 0, false, LONDON);
    0x49 => BLOBHASH       (1, 1, 0, false, CANCUN);
    0x4a => BLOBBASEFEE    (0, 1, 0, false, CANCUN);

    0x50 => POP            (1, 0, 0, false, FRONTIER);
    0x51 => MLOAD          (1, 1, 0, false, FRONTIER);
    0x52 => MSTORE         (2, 0, 0, false, FRONTIER);
    0x53 => MSTORE8        (2, 0, 0, false, FRONTIER);
    0x54 => SLOAD          (1, 1, 0, false, FRONTIER);
    0x55 => SSTORE         (2, 0, 0, false, FRONTIER);
    0x56 => JUMP           (1, 0, 0, false, FRONTIER);
    0x57 => JUMPI          (2, 0, 0, false, FRONTIER);
    0x58 => PC             (0, 1, 0, false, FRONTIER);
    0x59 => MSIZE          (0, 1, 0, false, FRONTIER);
    0x5a => GAS            (0, 1, 0, false, FRONTIER);
    0x5b => JUMPDEST       (0, 0, 0, false, FRONTIER);
    0x5c => TLOAD          (1, 1, 0, false, CANCUN);
    0x5d => TSTORE         (2, 0, 0, false, CANCUN);
    0x5e => MCOPY          (3, 0, 0, false, CANCUN);
    0x5f => PUSH0          (0, 1, 0, false, SHANGHAI);

    0x60 => PUSH1          (0, 1, 1, false, FRONTIER);
    0x61 => PUSH2          (0, 1, 2, false, FRONTIER);
    0x62 => PUSH3          (0, 1, 3, false, FRONTIER);
    0x63 => PUSH4          (0, 1, 4, false, FRONTIER);
    0x64 => PUSH5          (0, 1, 5, false, FRONTIER);
    0x65 => PUSH6          (0, 1, 6, false, FRONTIER);
    0x66 => PUSH7          (0, 1, 7, false, FRONTIER);
    0x67 => PUSH8          (0, 1, 8, false, FRONTIER);
    0x68 => PUSH9          (0, 1, 9, false, FRONTIER);
    0x69 => PUSH10         (0, 1, 10, false, FRONTIER);
    0x6a => PUSH11         (0, 1, 11, false, FRONTIER);
    0x6b => PUSH12         (0, 1, 12, false, FRONTIER);
    0x6c => PUSH13         (0, 1, 13, false, FRONTIER);
    0x6d => PUSH14         (0, 1, 14, false, FRONTIER);
    0x6e => PUSH15         (0, 1, 15, false, FRONTIER);
    0x6f => PUSH16         (0, 1, 16, false, FRONTIER);
    0x70 => PUSH17         (0, 1, 17, false, FRONTIER);
    0x71 => PUSH18         (0, 1, 18, false, FRONTIER);
    0x72 => PUSH19         (0, 1, 19, false, FRONTIER);
    0x73 => PUSH20         (0, 1, 20, false, FRONTIER);
    0x74 => PUSH21         (0, 1, 21, false, FRONTIER);
    0x75 => PUSH22         (0, 1, 22, false, FRONTIER);
    0x76 => PUSH23         (0, 1, 23, false, FRONTIER);
    0x77 => PUSH24         (0, 1, 24, false, FRONTIER);
    0x78 => PUSH25         (0, 1, 25, false, FRONTIER);
    0x79 => PUSH26         (0, 1, 26, false, FRONTIER);
    0x7a => PUSH27         (0, 1, 27, false, FRONTIER);
    0x7b => PUSH28         (0, 1, 28, false, FRONTIER);
    0x7c => PUSH29         (0, 1, 29, false, FRONTIER);
    0x7d => PUSH30         (0, 1, 30, false, FRONTIER);
    0x7e => PUSH31         (0, 1, 31, false, FRONTIER);
    0x7f => PUSH32         (0, 1, 32, false, FRONTIER);

    0x80 => DUP1           (1, 2, 0, false, FRONTIER);
    0x81 => DUP2           (2, 3, 0, false, FRONTIER);
    0x82 => DUP3           (3, 4, 0, false, FRONTIER);
    0x83 => DUP4           (4, 5, 0, false, FRONTIER);
    0x84 => DUP5           (5, 6, 0, false, FRONTIER);
    0x85 => DUP6           (6, 7, 0, false, FRONTIER);
    0x86 => DUP7           (7, 8, 0, false, FRONTIER);
    0x87 => DUP8           (8, 9, 0, false, FRONTIER);
    0x88 => DUP9           (9, 10, 0, false, FRONTIER);
    0x89 => DUP10          (10, 11, 0, false, FRONTIER);
    0x8a => DUP11          (11, 12, 0, false, FRONTIER);
    0x8b => DUP12          (12, 13, 0, false, FRONTIER);
    0x8c => DUP13          (13, 14, 0, false, FRONTIER);
    0x8d => DUP14          (14, 15, 0, false, FRONTIER);
    0x8e => DUP15          (15, 16, 0, false, FRONTIER);
    0x8f => DUP16          (16, 17, 0, false, FRONTIER);

    0x90 => SWAP1          (2, 2, 0, false, FRONTIER);
    0x91 => SWAP2          (3, 3, 0, false, FRONTIER);
    0x92 => SWAP3          (4, 4, 0, false, FRONTIER);
    0x93 => SWAP4          (5, 5, 0, false, FRONTIER);
    0x94 => SWAP5          (6, 6, 0, false, FRONTIER);
    0x95 => SWAP6          (7, 7, 0, false, FRONTIER);
    0x96 => SWAP7          (8, 8, 0, false, FRONTIER);
    0x97 => SWAP8          (9, 9, 0, false, FRONTIER);
    0x98 => SWAP9          (10, 10, 0, false, FRONTIER);
    0x99 => SWAP10         (11, 11, 0, false, FRONTIER);
    0x9a => SWAP11         (12, 12, 0, false, FRONTIER);
    0x9b => SWAP12         (13, 13, 0, false, FRONTIER);
    0x9c => SWAP13         (14, 14, 0, false, FRONTIER);
    0x9d => SWAP14         (15, 15, 0, false, FRONTIER);
    0x9e => SWAP15         (16, 16, 0, false, FRONTIER);
    0x9f => SWAP16         (17, 17, 0, false, FRONTIER);

    0xa0 => LOG0           (2, 0, 0, false, FRONTIER);
    0xa1 => LOG1           (3, 0, 0, false, FRONTIER);
    0xa2 => LOG2           (4, 0, 0, false, FRONTIER);
    0xa3 => LOG3           (5, 0, 0, false, FRONTIER);
    0xa4 => LOG4           (6, 0, 0, false, FRONTIER);

    0xf0 => CREATE         (3, 1, 0, false, FRONTIER);
    0xf1 => CALL           (7, 1, 0, false, FRONTIER);
    0xf2 => CALLCODE       (7, 1, 0, false, FRONTIER);
    0xf3 => RETURN         (2, 0, 0, true,  FRONTIER);
    0xf4 => DELEGATECALL   (6, 1, 0, false, HOMESTEAD);
    0xf5 => CREATE2        (4, 1, 0, false, PETERSBURG);
    0xfa => STATICCALL     (6, 1, 0, false, BYZANTIUM);
    0xfd => REVERT         (2, 0, 0, true,  BYZANTIUM);
    0xfe => INVALID        (0, 0, 0, true,  FRONTIER);
    0xff => SELFDESTRUCT   (1, 0, 0, true,  FRONTIER);
}

/// Returns the metadata of `opcode`, or `None` for undefined bytes.
#[inline]
pub const fn info(opcode: u8) -> Option<OpInfo> {
    OPCODE_INFO[opcode as usize]
}

/// Parses a mnemonic back into its opcode byte.
pub fn parse(name: &str) -> Option<u8> {
    (0..=u8::MAX).find(|&opcode| matches!(info(opcode), Some(i) if i.name() == name))
}

/// Static (analysis-time) gas cost of an opcode under the given hardfork.
///
/// This is the portion charged up front at basic-block entry. Size- and
/// state-dependent surcharges (memory expansion, cold access, copy words,
/// net-metered SSTORE, value transfer) are charged inside the handlers.
pub const fn static_gas(opcode: u8, spec: SpecId) -> u64 {
    match opcode {
        STOP | RETURN | REVERT | INVALID | SSTORE => 0,
        ADD | SUB | NOT | LT | GT | SLT | SGT | EQ | ISZERO | AND | OR | XOR | BYTE | SHL
        | SHR | SAR | CALLDATALOAD | MLOAD | MSTORE | MSTORE8 | BLOBHASH => 3,
        PUSH1..=PUSH32 | DUP1..=DUP16 | SWAP1..=SWAP16 => 3,
        MUL | DIV | SDIV | MOD | SMOD | SIGNEXTEND | SELFBALANCE => 5,
        ADDMOD | MULMOD | JUMP => 8,
        JUMPI | EXP => 10,
        KECCAK256 => 30,
        ADDRESS | ORIGIN | CALLER | CALLVALUE | CALLDATASIZE | CODESIZE | GASPRICE | COINBASE
        | TIMESTAMP | NUMBER | DIFFICULTY | GASLIMIT | RETURNDATASIZE | POP | PC | MSIZE | GAS
        | CHAINID | BASEFEE | BLOBBASEFEE | PUSH0 => 2,
        CALLDATACOPY | CODECOPY | RETURNDATACOPY | MCOPY => 3,
        BALANCE => {
            if spec.is_enabled_in(SpecId::BERLIN) {
                100
            } else if spec.is_enabled_in(SpecId::ISTANBUL) {
                700
            } else if spec.is_enabled_in(SpecId::TANGERINE) {
                400
            } else {
                20
            }
        }
        EXTCODESIZE | EXTCODECOPY => {
            if spec.is_enabled_in(SpecId::BERLIN) {
                100
            } else if spec.is_enabled_in(SpecId::TANGERINE) {
                700
            } else {
                20
            }
        }
        EXTCODEHASH => {
            if spec.is_enabled_in(SpecId::BERLIN) {
                100
            } else if spec.is_enabled_in(SpecId::ISTANBUL) {
                700
            } else {
                400
            }
        }
        SLOAD => {
            if spec.is_enabled_in(SpecId::BERLIN) {
                100
            } else if spec.is_enabled_in(SpecId::ISTANBUL) {
                800
            } else if spec.is_enabled_in(SpecId::TANGERINE) {
                200
            } else {
                50
            }
        }
        JUMPDEST => 1,
        TLOAD | TSTORE => 100,
        LOG0..=LOG4 => 375 + 375 * (opcode - LOG0) as u64,
        CREATE | CREATE2 => 32000,
        CALL | CALLCODE | DELEGATECALL | STATICCALL => {
            if spec.is_enabled_in(SpecId::BERLIN) {
                100
            } else if spec.is_enabled_in(SpecId::TANGERINE) {
                700
            } else {
                40
            }
        }
        BLOCKHASH => 20,
        SELFDESTRUCT => {
            if spec.is_enabled_in(SpecId::TANGERINE) {
                5000
            } else {
                0
            }
        }
        _ => 0,
    }
}

/// Synthetic stream-only opcodes emitted by the analyzer. They occupy slots
/// past the 256 real opcode values in the handler table.
pub mod synthetic {
    /// Charges the gas of a basic block and validates its stack bounds.
    /// Emitted at block starts that are not a `JUMPDEST`.
    pub const BEGINBLOCK: u16 = 0x100;
    /// PUSH whose immediate does not fit a metadata slot; the metadata is an
    /// index into the stream's constants table.
    pub const PUSH_CONST: u16 = 0x101;
    /// Fused PUSH + ADD.
    pub const PUSH_ADD: u16 = 0x102;
    /// Fused PUSH + MUL.
    pub const PUSH_MUL: u16 = 0x103;
    /// Fused PUSH + SUB.
    pub const PUSH_SUB: u16 = 0x104;
    /// Fused PUSH + DIV.
    pub const PUSH_DIV: u16 = 0x105;
    /// Fused PUSH + AND.
    pub const PUSH_AND: u16 = 0x106;
    /// Fused PUSH + OR.
    pub const PUSH_OR: u16 = 0x107;
    /// Fused PUSH + XOR.
    pub const PUSH_XOR: u16 = 0x108;
    /// Fused PUSH + JUMP with a statically validated destination; the
    /// metadata is the destination slot index.
    pub const PUSH_JUMP: u16 = 0x109;
    /// Fused PUSH + JUMPI with a statically validated destination.
    pub const PUSH_JUMPI: u16 = 0x10a;

    /// Total number of handler-table entries, real opcodes included.
    pub const TABLE_LEN: usize = 0x10b;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_immediates() {
        assert_eq!(info(PUSH1).unwrap().immediate_size(), 1);
        assert_eq!(info(PUSH32).unwrap().immediate_size(), 32);
        assert_eq!(info(PUSH0).unwrap().immediate_size(), 0);
        assert_eq!(info(ADD).unwrap().immediate_size(), 0);
    }

    #[test]
    fn undefined_bytes() {
        assert!(info(0x0c).is_none());
        assert!(info(0x21).is_none());
        assert!(info(0xef).is_none());
        assert!(info(0xfb).is_none());
    }

    #[test]
    fn fork_gating() {
        assert!(!info(PUSH0).unwrap().is_enabled_in(SpecId::MERGE));
        assert!(info(PUSH0).unwrap().is_enabled_in(SpecId::SHANGHAI));
        assert!(!info(TLOAD).unwrap().is_enabled_in(SpecId::SHANGHAI));
        assert!(info(TLOAD).unwrap().is_enabled_in(SpecId::CANCUN));
        assert!(!info(REVERT).unwrap().is_enabled_in(SpecId::HOMESTEAD));
    }

    #[test]
    fn mnemonic_roundtrip() {
        for opcode in [STOP, ADD, KECCAK256, JUMPDEST, PUSH32, SWAP16, SELFDESTRUCT] {
            let name = info(opcode).unwrap().name();
            assert_eq!(parse(name), Some(opcode));
        }
        assert_eq!(parse("MLOAD"), Some(MLOAD));
        assert_eq!(parse("NOSUCHOP"), None);
    }

    #[test]
    fn static_gas_repricings() {
        assert_eq!(static_gas(SLOAD, SpecId::FRONTIER), 50);
        assert_eq!(static_gas(SLOAD, SpecId::TANGERINE), 200);
        assert_eq!(static_gas(SLOAD, SpecId::ISTANBUL), 800);
        assert_eq!(static_gas(SLOAD, SpecId::BERLIN), 100);
        assert_eq!(static_gas(BALANCE, SpecId::ISTANBUL), 700);
        assert_eq!(static_gas(CALL, SpecId::FRONTIER), 40);
        assert_eq!(static_gas(CALL, SpecId::CANCUN), 100);
        assert_eq!(static_gas(LOG3, SpecId::CANCUN), 375 + 3 * 375);
        assert_eq!(static_gas(SELFDESTRUCT, SpecId::FRONTIER), 0);
        assert_eq!(static_gas(SELFDESTRUCT, SpecId::CANCUN), 5000);
    }
}
