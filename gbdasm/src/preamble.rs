//! Finds the code in a ROM image by following the cartridge's fixed layout.
//!
//! Every Gameboy ROM starts the same way: the RST vectors and interrupt handlers occupy $0000-$0067, and execution
//! begins at $0100 with a tiny trampoline, almost always a NOP followed by a JP over the cartridge header. We
//! disassemble the vectors, walk the trampoline, and then follow its jump to disassemble the start of the program
//! proper, stopping at the end of the cartridge ROM space.

use crate::decode::decode_one;
use crate::error::{Error, Result};
use crate::instruction::Instruction;
use crate::listing::{disassemble_range, Listing, Outcome};
use byteorder::{ByteOrder, LittleEndian};
use log::debug;
use std::fmt;
use std::io::Cursor;

pub const VECTORS_START: u32 = 0x0000;
pub const VECTORS_END: u32 = 0x0068;
pub const ENTRY_POINT: u32 = 0x0100;
pub const CODE_END: u32 = 0x8000;

const OP_NOP: u8 = 0x00;
const OP_JP: u8 = 0xC3;

/// A titled chunk of disassembly.
#[derive(Clone, Debug)]
pub struct Section {
    pub title: &'static str,
    pub instructions: Vec<Instruction>,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "---------------- {:<40} ----------------", self.title)?;
        for inst in &self.instructions {
            writeln!(f, "{}", inst)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct Preamble {
    pub vectors: Section,
    pub entry: Section,
    pub code: Section,
    /// Where the entry trampoline jumps to.
    pub code_start: u32,
}

impl fmt::Display for Preamble {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\n{}\n{}", self.vectors, self.entry, self.code)
    }
}

/// The outcome of a walk that stopped early: whatever sections were disassembled up to that point, and why it
/// stopped.
#[derive(Debug)]
pub struct PartialPreamble {
    pub sections: Vec<Section>,
    pub error: Error,
}

impl fmt::Display for PartialPreamble {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", section)?;
        }
        Ok(())
    }
}

fn section_from(title: &'static str, listing: Listing) -> std::result::Result<Section, (Section, Error)> {
    let section = Section { title, instructions: listing.instructions };
    match listing.outcome {
        Outcome::Completed => Ok(section),
        Outcome::Aborted { address, error } => Err((section, Error::Decode { address, source: error })),
    }
}

fn cursor_at(rom: &[u8], address: u32) -> Cursor<&[u8]> {
    let mut rdr = Cursor::new(rom);
    rdr.set_position(u64::from(address));
    rdr
}

/// Disassembles the RST/interrupt vector table.
pub fn vectors(rom: &[u8]) -> Listing {
    disassemble_range(cursor_at(rom, VECTORS_START), VECTORS_START, VECTORS_END)
}

/// Walks the entry point: every leading NOP, and the instruction that follows them.
pub fn entry_trampoline(rom: &[u8]) -> Result<Vec<Instruction>> {
    let mut rdr = cursor_at(rom, ENTRY_POINT);
    let mut address = ENTRY_POINT;
    let mut instructions = Vec::new();

    loop {
        let (inst, next) = decode_one(&mut rdr, address);
        let inst = inst.ok_or(Error::TruncatedEntryPoint)?;
        address = next;

        let is_nop = inst.opcode() == Some(OP_NOP);
        instructions.push(inst);
        if !is_nop {
            return Ok(instructions);
        }
    }
}

/// Extracts the target of the trampoline's final `jp nn`.
pub fn entry_target(trampoline: &[Instruction]) -> Result<u32> {
    let last = trampoline.last().ok_or(Error::TruncatedEntryPoint)?;
    match last.opcode() {
        Some(OP_JP) if last.error.is_none() => Ok(u32::from(LittleEndian::read_u16(&last.raw_bytes[1..3]))),
        Some(OP_JP) => Err(Error::TruncatedEntryPoint),
        Some(opcode) => Err(Error::EntryPointNotJump { opcode }),
        None => Err(Error::TruncatedEntryPoint),
    }
}

/// Runs the full walk: vectors, trampoline, then code from the trampoline's target up to the end of ROM space.
pub fn walk(rom: &[u8]) -> std::result::Result<Preamble, PartialPreamble> {
    let mut sections = Vec::new();

    debug!("disassembling vectors ${:04x}-${:04x}", VECTORS_START, VECTORS_END);
    let vectors = match section_from("RST and Interrupt table", vectors(rom)) {
        Ok(s) => s,
        Err((s, error)) => {
            sections.push(s);
            return Err(PartialPreamble { sections, error });
        }
    };
    sections.push(vectors.clone());

    debug!("walking entry point at ${:04x}", ENTRY_POINT);
    let trampoline = match entry_trampoline(rom) {
        Ok(t) => t,
        Err(error) => return Err(PartialPreamble { sections, error }),
    };
    let target = entry_target(&trampoline);
    let entry = Section { title: "Code Entry Point (Trampoline)", instructions: trampoline };
    sections.push(entry.clone());

    let code_start = match target {
        Ok(t) => t,
        Err(error) => return Err(PartialPreamble { sections, error }),
    };

    debug!("disassembling code ${:04x}-${:04x}", code_start, CODE_END);
    let listing = disassemble_range(cursor_at(rom, code_start), code_start, CODE_END);
    match section_from("Code Start", listing) {
        Ok(code) => Ok(Preamble { vectors, entry, code, code_start }),
        Err((s, error)) => {
            sections.push(s);
            Err(PartialPreamble { sections, error })
        }
    }
}
