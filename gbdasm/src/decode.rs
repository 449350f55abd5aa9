//! The instruction decoder. Reads one opcode (two for the CB-prefixed bit operations) from a byte stream, classifies
//! it by its encoding fields and pulls whatever immediate operands it needs.
//!
//! The opcode map is the Z80's with a bunch of holes punched in it: the Gameboy CPU has no port I/O instructions
//! (other than the $FF00 page loads that took over some of those slots), no EX instructions, no IX/IY registers and
//! no ED-prefixed extended set. Those slots decode as `IllegalInstruction`. A handful of other slots were repurposed
//! (LDI/LDD, LD ($FF00+n), ADD SP, LDHL, STOP, RETI, SWAP) and are decoded as such.
//!
//! Reference: www.z80.info/decoding.htm, with the LR35902 substitutions applied.

use crate::error::DecodeError;
use crate::instruction::Instruction;
use crate::operands::Decoder;
use crate::tables::{self, Fields};
use log::{debug, trace};
use std::io::{self, Read};

/// Decodes the instruction at the current position of `stream`, which is assumed to live at `address`.
///
/// Returns `None` (and `address` unchanged) only if the stream was already exhausted. Otherwise an instruction is
/// always returned, carrying an error if decoding failed part way, and the address following it. The stream is
/// advanced by exactly the bytes recorded in the instruction's `raw_bytes`.
pub fn decode_one<R: Read>(stream: &mut R, address: u32) -> (Option<Instruction>, u32) {
    let mut d = Decoder::new(stream);

    let op = match d.fetch() {
        Ok(op) => op,
        Err(DecodeError::MalformedInstruction) => return (None, address),
        Err(e) => return (Some(d.finish(address, Err(e))), address),
    };

    let result = decode_primary(&mut d, op);
    let inst = d.finish(address, result);

    match inst.error {
        None => trace!("${:04x}: {}", address, inst.tokens.join(" ")),
        Some(DecodeError::IllegalInstruction) => debug!("${:04x}: illegal opcode ${:02x}", address, op),
        Some(e) => debug!("${:04x}: {} (opcode ${:02x})", address, e, op),
    }

    let next = inst.next_address();
    (Some(inst), next)
}

/// Convenience for decoding the first instruction in a byte slice.
pub fn decode_slice(bytes: &[u8], address: u32) -> Option<Instruction> {
    decode_one(&mut io::Cursor::new(bytes), address).0
}

fn decode_primary<R: Read>(d: &mut Decoder<R>, op: u8) -> Result<(), DecodeError> {
    let f = Fields::new(op);

    match f.x {
        0 => decode_x0(d, f),
        // LD (HL),(HL) is HALT.
        1 if f.z == 6 && f.y == 6 => implied(d, "halt"),
        1 => ld_r8_r8(d, f),
        2 => alu_r8(d, f),
        _ => decode_x3(d, f),
    }
}

fn decode_x0<R: Read>(d: &mut Decoder<R>, f: Fields) -> Result<(), DecodeError> {
    match f.z {
        0 => match f.y {
            0 => implied(d, "nop"),
            1 => ld_addr16_sp(d),
            2 => implied(d, "stop"),
            3 => jr(d),
            _ => jr_cc(d, f),
        },
        1 => match f.q {
            0 => ld_r16_imm16(d, f),
            _ => {
                d.emit_all(&["add", "hl", tables::register_pair_sp(f.p)]);
                Ok(())
            }
        },
        2 => {
            let indirect = match f.p {
                0 => ("ld", "[bc]"),
                1 => ("ld", "[de]"),
                2 => ("ldi", "[hl]"),
                _ => ("ldd", "[hl]"),
            };
            match f.q {
                0 => d.emit_all(&[indirect.0, indirect.1, "a"]),
                _ => d.emit_all(&[indirect.0, "a", indirect.1]),
            }
            Ok(())
        }
        3 => {
            let mnemonic = if f.q == 0 { "inc" } else { "dec" };
            d.emit_all(&[mnemonic, tables::register_pair_sp(f.p)]);
            Ok(())
        }
        4 => {
            d.emit_all(&["inc", tables::register(f.y)]);
            Ok(())
        }
        5 => {
            d.emit_all(&["dec", tables::register(f.y)]);
            Ok(())
        }
        6 => ld_r8_imm8(d, f),
        _ => {
            let mnemonic = match f.y {
                0 => "rlca",
                1 => "rrca",
                2 => "rla",
                3 => "rra",
                4 => "daa",
                5 => "cpl",
                6 => "scf",
                _ => "ccf",
            };
            implied(d, mnemonic)
        }
    }
}

fn decode_x3<R: Read>(d: &mut Decoder<R>, f: Fields) -> Result<(), DecodeError> {
    match f.z {
        0 => match f.y {
            0..=3 => {
                d.emit_all(&["ret", tables::condition(f.y)]);
                Ok(())
            }
            4 => ldh_imm8_a(d),
            5 => add_sp_simm8(d),
            6 => ldh_a_imm8(d),
            _ => ldhl_sp_simm8(d),
        },
        1 => match (f.q, f.p) {
            (0, _) => {
                d.emit_all(&["pop", tables::register_pair_af(f.p)]);
                Ok(())
            }
            (_, 0) => implied(d, "ret"),
            (_, 1) => implied(d, "reti"),
            (_, 2) => {
                d.emit_all(&["jp", "[hl]"]);
                Ok(())
            }
            _ => {
                d.emit_all(&["ld", "sp", "hl"]);
                Ok(())
            }
        },
        2 => match f.y {
            0..=3 => jp_cc_imm16(d, f),
            4 => {
                d.emit_all(&["ld", "[0xff00 + C]", "a"]);
                Ok(())
            }
            5 => ld_addr16_a(d),
            6 => {
                d.emit_all(&["ld", "a", "[0xff00 + C]"]);
                Ok(())
            }
            _ => ld_a_addr16(d),
        },
        3 => match f.y {
            0 => jp_imm16(d),
            1 => decode_cb(d),
            // OUT (n),A / IN A,(n) / EX (SP),HL / EX DE,HL
            2..=5 => Err(DecodeError::IllegalInstruction),
            6 => implied(d, "di"),
            _ => implied(d, "ei"),
        },
        4 => match f.y {
            0..=3 => call_cc_imm16(d, f),
            _ => Err(DecodeError::IllegalInstruction),
        },
        5 => match (f.q, f.p) {
            (0, _) => {
                d.emit_all(&["push", tables::register_pair_af(f.p)]);
                Ok(())
            }
            (_, 0) => call_imm16(d),
            // The DD, ED and FD prefixes.
            _ => Err(DecodeError::IllegalInstruction),
        },
        6 => alu_imm8(d, f),
        _ => {
            d.emit("rst");
            d.emit(format!("0x{:02x}", f.y * 8));
            Ok(())
        }
    }
}

/// Decodes the second byte of a CB-prefixed opcode. The operation, bit index and register are all encoded in that
/// byte, nothing else follows it.
fn decode_cb<R: Read>(d: &mut Decoder<R>) -> Result<(), DecodeError> {
    let f = Fields::new(d.fetch()?);
    let reg = tables::register(f.z);

    match f.x {
        0 => rotate_shift(d, f.y, reg),
        1 => bit_op(d, "bit", f.y, reg),
        2 => bit_op(d, "res", f.y, reg),
        _ => bit_op(d, "set", f.y, reg),
    }
}

fn rotate_shift<R: Read>(d: &mut Decoder<R>, op: u8, reg: &str) -> Result<(), DecodeError> {
    d.emit_all(&[tables::rotate_shift(op), reg]);
    Ok(())
}

fn bit_op<R: Read>(d: &mut Decoder<R>, mnemonic: &str, bit: u8, reg: &str) -> Result<(), DecodeError> {
    d.emit(mnemonic);
    d.emit(bit.to_string());
    d.emit(reg);
    Ok(())
}

fn implied<R: Read>(d: &mut Decoder<R>, mnemonic: &str) -> Result<(), DecodeError> {
    d.emit(mnemonic);
    Ok(())
}

fn ld_r8_r8<R: Read>(d: &mut Decoder<R>, f: Fields) -> Result<(), DecodeError> {
    d.emit_all(&["ld", tables::register(f.y), tables::register(f.z)]);
    Ok(())
}

fn alu_r8<R: Read>(d: &mut Decoder<R>, f: Fields) -> Result<(), DecodeError> {
    d.emit_all(tables::alu(f.y));
    d.emit(tables::register(f.z));
    Ok(())
}

fn alu_imm8<R: Read>(d: &mut Decoder<R>, f: Fields) -> Result<(), DecodeError> {
    d.emit_all(tables::alu(f.y));
    let n = d.imm8()?;
    d.emit(n);
    Ok(())
}

fn ld_r8_imm8<R: Read>(d: &mut Decoder<R>, f: Fields) -> Result<(), DecodeError> {
    d.emit_all(&["ld", tables::register(f.y)]);
    let n = d.imm8()?;
    d.emit(n);
    Ok(())
}

fn ld_r16_imm16<R: Read>(d: &mut Decoder<R>, f: Fields) -> Result<(), DecodeError> {
    d.emit_all(&["ld", tables::register_pair_sp(f.p)]);
    let nn = d.imm16()?;
    d.emit(nn);
    Ok(())
}

fn ld_addr16_sp<R: Read>(d: &mut Decoder<R>) -> Result<(), DecodeError> {
    d.emit("ld");
    let addr = d.addr16()?;
    d.emit(addr);
    d.emit("sp");
    Ok(())
}

fn ld_addr16_a<R: Read>(d: &mut Decoder<R>) -> Result<(), DecodeError> {
    d.emit("ld");
    let addr = d.addr16()?;
    d.emit(addr);
    d.emit("a");
    Ok(())
}

fn ld_a_addr16<R: Read>(d: &mut Decoder<R>) -> Result<(), DecodeError> {
    d.emit_all(&["ld", "a"]);
    let addr = d.addr16()?;
    d.emit(addr);
    Ok(())
}

fn ldh_imm8_a<R: Read>(d: &mut Decoder<R>) -> Result<(), DecodeError> {
    d.emit("ld");
    let n = d.imm8()?;
    d.emit(format!("[0xff00 + {}]", n));
    d.emit("a");
    Ok(())
}

fn ldh_a_imm8<R: Read>(d: &mut Decoder<R>) -> Result<(), DecodeError> {
    d.emit_all(&["ld", "a"]);
    let n = d.imm8()?;
    d.emit(format!("[0xff00 + {}]", n));
    Ok(())
}

fn add_sp_simm8<R: Read>(d: &mut Decoder<R>) -> Result<(), DecodeError> {
    d.emit_all(&["add", "sp"]);
    let e = d.simm8()?;
    d.emit(e);
    Ok(())
}

fn ldhl_sp_simm8<R: Read>(d: &mut Decoder<R>) -> Result<(), DecodeError> {
    d.emit_all(&["ldhl", "sp"]);
    let e = d.simm8()?;
    d.emit(e);
    Ok(())
}

fn jr<R: Read>(d: &mut Decoder<R>) -> Result<(), DecodeError> {
    d.emit("jr");
    let e = d.simm8()?;
    d.emit(e);
    Ok(())
}

fn jr_cc<R: Read>(d: &mut Decoder<R>, f: Fields) -> Result<(), DecodeError> {
    d.emit_all(&["jr", tables::jr_condition(f.y)]);
    let e = d.simm8()?;
    d.emit(e);
    Ok(())
}

fn jp_imm16<R: Read>(d: &mut Decoder<R>) -> Result<(), DecodeError> {
    d.emit("jp");
    let nn = d.imm16()?;
    d.emit(nn);
    Ok(())
}

fn jp_cc_imm16<R: Read>(d: &mut Decoder<R>, f: Fields) -> Result<(), DecodeError> {
    d.emit_all(&["jp", tables::condition(f.y)]);
    let nn = d.imm16()?;
    d.emit(nn);
    Ok(())
}

fn call_imm16<R: Read>(d: &mut Decoder<R>) -> Result<(), DecodeError> {
    d.emit("call");
    let nn = d.imm16()?;
    d.emit(nn);
    Ok(())
}

fn call_cc_imm16<R: Read>(d: &mut Decoder<R>, f: Fields) -> Result<(), DecodeError> {
    d.emit_all(&["call", tables::condition(f.y)]);
    let nn = d.imm16()?;
    d.emit(nn);
    Ok(())
}
