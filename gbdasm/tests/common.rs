use gbdasm::{decode_one, DecodeError, Instruction};
use std::io::Cursor;

/// Decodes the first instruction of `bytes` at address 0, returning it along with how far the stream advanced.
pub fn decode(bytes: &[u8]) -> (Instruction, u64) {
    let mut rdr = Cursor::new(bytes);
    let (inst, _) = decode_one(&mut rdr, 0);
    (inst.expect("stream was not empty"), rdr.position())
}

/// The instruction as assembly text: mnemonic, then comma separated operands.
pub fn asm(inst: &Instruction) -> String {
    match inst.mnemonic() {
        Some(m) if inst.operands().is_empty() => m.to_string(),
        Some(m) => format!("{} {}", m, inst.operands().join(", ")),
        None => String::new(),
    }
}

pub fn check(bytes: &[u8], expected: &str) {
    let (inst, advanced) = decode(bytes);
    assert_eq!(inst.error, None, "{:02x?} failed to decode", bytes);
    assert_eq!(asm(&inst), expected);
    assert_eq!(inst.raw_bytes, bytes);
    assert_eq!(advanced, bytes.len() as u64);
}

pub fn check_illegal(op: u8) {
    let (inst, advanced) = decode(&[op, 0x00, 0x00]);
    assert_eq!(inst.error, Some(DecodeError::IllegalInstruction), "${:02x} should be illegal", op);
    assert_eq!(inst.raw_bytes, vec![op]);
    assert_eq!(advanced, 1);
}

/// Instruction lengths of the unprefixed opcodes, per the Gameboy CPU manual (with STOP counted as a single byte).
pub fn expected_len(op: u8) -> usize {
    match op {
        0x01 | 0x11 | 0x21 | 0x31 | 0x08 => 3,
        0xC2 | 0xCA | 0xD2 | 0xDA | 0xC3 => 3,
        0xC4 | 0xCC | 0xD4 | 0xDC | 0xCD => 3,
        0xEA | 0xFA => 3,
        0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => 2,
        0x18 | 0x20 | 0x28 | 0x30 | 0x38 => 2,
        0xE0 | 0xE8 | 0xF0 | 0xF8 => 2,
        0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => 2,
        0xCB => 2,
        _ => 1,
    }
}

pub const ILLEGAL: [u8; 11] = [0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD];
