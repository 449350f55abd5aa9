//! Name tables for the encoded fields of an opcode byte.
//!
//! The LR35902 opcode map is laid out like the Z80's: most opcodes are built from a handful of small bitfields, each
//! selecting a register, register pair, condition or operation. Rather than spelling out all 500-odd opcodes, the
//! decoder splits each byte into those fields once (see `Fields`) and looks the names up here.
//!
//! ```text
//!   7 6 5 4 3 2 1 0
//!  [ x ][  y  ][ z ]
//!      [ p ][q]
//! ```

/// 8-bit registers, indexed by `y` (destination position) or `z` (source position). Index 6 is the memory
/// operand addressed by HL.
pub const REGISTERS: [&str; 8] = ["b", "c", "d", "e", "h", "l", "[hl]", "a"];

/// Register pairs as used by LD/INC/DEC/ADD, indexed by `p`.
pub const REGISTER_PAIRS_SP: [&str; 4] = ["bc", "de", "hl", "sp"];

/// Register pairs as used by PUSH/POP, indexed by `p`. The top pair is AF instead of SP.
pub const REGISTER_PAIRS_AF: [&str; 4] = ["bc", "de", "hl", "af"];

/// Branch conditions, indexed by `y`. Only the first four exist on this CPU; the parity/sign conditions are kept so
/// that the table lines up with the Z80 reference map.
pub const CONDITIONS: [&str; 8] = ["NZ", "Z", "NC", "C", "PO", "PE", "P", "M"];

/// CB-prefixed rotate and shift operations, indexed by `y` of the second byte. SWAP takes the slot the Z80 used
/// for SLL.
pub const ROTATE_SHIFT: [&str; 8] = ["rlc", "rrc", "rl", "rr", "sla", "sra", "swap", "srl"];

/// ALU operations, indexed by `y`. ADD, ADC and SBC name the accumulator explicitly, the rest leave it implied.
pub const ALU: [&[&str]; 8] = [
    &["add", "a"],
    &["adc", "a"],
    &["sub"],
    &["sbc", "a"],
    &["and"],
    &["xor"],
    &["or"],
    &["cp"],
];

/// Operands of the ED-prefixed IM instruction, indexed by `y` of the second byte.
pub const INTERRUPT_MODES: [&str; 8] = ["0", "0/1", "1", "2", "0", "0/1", "1", "2"];

/// ED-prefixed block transfer/search/IO instructions. Rows are `y - 4`, columns are `z`.
pub const BLOCK_INSTRUCTIONS: [[&str; 4]; 4] = [
    ["ldi", "cpi", "ini", "outi"],
    ["ldd", "cpd", "ind", "outd"],
    ["ldir", "cpir", "inir", "otir"],
    ["lddr", "cpdr", "indr", "otdr"],
];

/// An opcode byte split into its encoding fields.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Fields {
    /// Bits 7-6: the quadrant of the opcode map.
    pub x: u8,
    /// Bits 5-3: destination register, condition, ALU op, bit index or row.
    pub y: u8,
    /// Bits 2-0: source register or column.
    pub z: u8,
    /// Bits 5-4: register pair.
    pub p: u8,
    /// Bit 3: selects between the two halves of a `p` row.
    pub q: u8,
}

impl Fields {
    pub fn new(op: u8) -> Fields {
        Fields {
            x: (op & 0xC0) >> 6,
            y: (op & 0x38) >> 3,
            z: op & 0x07,
            p: (op & 0x30) >> 4,
            q: (op & 0x08) >> 3,
        }
    }
}

pub fn register(index: u8) -> &'static str {
    REGISTERS[usize::from(index & 0x7)]
}

pub fn register_pair_sp(p: u8) -> &'static str {
    REGISTER_PAIRS_SP[usize::from(p & 0x3)]
}

pub fn register_pair_af(p: u8) -> &'static str {
    REGISTER_PAIRS_AF[usize::from(p & 0x3)]
}

pub fn condition(y: u8) -> &'static str {
    CONDITIONS[usize::from(y & 0x7)]
}

/// The condition of a `jr cc, e` opcode. These live at y=4..7, but only encode NZ/Z/NC/C, so the index is shifted
/// down into the first half of the condition table. Values of `y` below 4 wrap around within that half.
pub fn jr_condition(y: u8) -> &'static str {
    CONDITIONS[usize::from(y.wrapping_sub(4) & 0x3)]
}

pub fn rotate_shift(y: u8) -> &'static str {
    ROTATE_SHIFT[usize::from(y & 0x7)]
}

pub fn alu(y: u8) -> &'static [&'static str] {
    ALU[usize::from(y & 0x7)]
}

pub fn interrupt_mode(y: u8) -> &'static str {
    INTERRUPT_MODES[usize::from(y & 0x7)]
}

/// Looks up the block instruction encoded by the second byte of an ED-prefixed opcode, if it names one.
pub fn block_instruction(op: u8) -> Option<&'static str> {
    let f = Fields::new(op);
    if f.y < 4 || f.z > 3 {
        return None;
    }
    Some(BLOCK_INSTRUCTIONS[usize::from(f.y - 4)][usize::from(f.z)])
}
