//! Walking a stream one instruction after another.
//!
//! `Disassembler` is the raw iterator: it decodes until the stream runs dry, keeping track of the running address.
//! `disassemble_range` layers the stop policy on top of that: it stops at an address ceiling, or straight after an
//! instruction whose error makes the rest of the stream unreliable.

use crate::decode::decode_one;
use crate::error::{DecodeError, Result};
use crate::instruction::Instruction;
use log::debug;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Iterates over the instructions in a stream, starting at a given address. Ends when the stream is exhausted, or
/// straight after yielding an instruction that consumed nothing or carries a fatal error. Illegal and unimplemented
/// instructions are yielded like any other.
pub struct Disassembler<R: Read> {
    stream: R,
    address: u32,
    done: bool,
}

impl<R: Read> Disassembler<R> {
    pub fn new(stream: R, address: u32) -> Disassembler<R> {
        Disassembler { stream, address, done: false }
    }

    /// The address the next instruction will be decoded at.
    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn into_inner(self) -> R {
        self.stream
    }
}

impl<R: Read> Iterator for Disassembler<R> {
    type Item = Instruction;

    fn next(&mut self) -> Option<Instruction> {
        if self.done {
            return None;
        }

        let (inst, next) = decode_one(&mut self.stream, self.address);
        self.address = next;
        match &inst {
            Some(i) if i.is_empty() || i.error.map_or(false, DecodeError::is_fatal) => self.done = true,
            Some(_) => {}
            None => self.done = true,
        }
        inst
    }
}

/// Why a walk over a range ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum Outcome {
    /// Hit the address ceiling or the end of the stream.
    Completed,
    /// Stopped after the instruction at `address` failed to decode.
    Aborted { address: u32, error: DecodeError },
}

/// The instructions decoded from one address range.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Listing {
    pub instructions: Vec<Instruction>,
    pub outcome: Outcome,
}

impl Listing {
    pub fn is_complete(&self) -> bool {
        self.outcome == Outcome::Completed
    }

    /// One rendered line per instruction, each terminated by a newline.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for inst in &self.instructions {
            out.push_str(&inst.to_string());
            out.push('\n');
        }
        out
    }

    /// Writes the listing in bincode form.
    pub fn save<W: Write>(&self, w: W) -> Result<()> {
        bincode::serialize_into(w, self)?;
        Ok(())
    }

    /// Reads back a listing written by `save`.
    pub fn load<R: Read>(r: R) -> Result<Listing> {
        Ok(bincode::deserialize_from(r)?)
    }
}

/// Decodes instructions from the stream's current position (which sits at `start`) for as long as they begin below
/// `end`. Illegal opcodes are kept and skipped over. A truncated or unreadable instruction is kept as the last entry
/// and ends the walk.
pub fn disassemble_range<R: Read>(stream: R, start: u32, end: u32) -> Listing {
    let mut instructions = Vec::new();
    let mut outcome = Outcome::Completed;

    for inst in Disassembler::new(stream, start) {
        if inst.address >= end {
            break;
        }

        let fatal = inst.error.filter(|e| e.is_fatal());
        let address = inst.address;
        instructions.push(inst);

        if let Some(error) = fatal {
            debug!("stopping at ${:04x}: {}", address, error);
            outcome = Outcome::Aborted { address, error };
            break;
        }
    }

    Listing { instructions, outcome }
}
