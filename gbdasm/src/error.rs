//! Errors produced while decoding instructions and while walking ROM images.
//!
//! Decoding failures never escape a decode call: they are attached to the `Instruction` record that was being built,
//! and the iteration layers ask `DecodeError::is_fatal` whether it's safe to keep walking the stream.

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// The four ways decoding a single instruction can go wrong.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error, Deserialize, Serialize)]
pub enum DecodeError {
    /// The opcode is complete, but names an operation this CPU doesn't have (port I/O, EX, the DD/ED/FD prefixes).
    #[error("Illegal Instruction")]
    IllegalInstruction,
    /// A slot in the opcode map that has no decode rule. The decoder never produces this, but callers must treat it
    /// like `IllegalInstruction`.
    #[error("Unimplemented Instruction")]
    UnimplementedInstruction,
    /// The stream ended before all the operand bytes of the instruction could be read.
    #[error("Malformed Instruction")]
    MalformedInstruction,
    /// Any other failure reported by the underlying reader.
    #[error("Unknown")]
    Unknown,
}

impl DecodeError {
    /// Classifies a read failure from the instruction stream.
    pub fn from_io(err: &io::Error) -> DecodeError {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => DecodeError::MalformedInstruction,
            _ => DecodeError::Unknown,
        }
    }

    /// Returns true if iteration must stop after an instruction carrying this error. Illegal and unimplemented
    /// opcodes still have a well defined length, so the next instruction can be decoded. Truncated or unreadable
    /// input can't be walked any further.
    pub fn is_fatal(self) -> bool {
        match self {
            DecodeError::IllegalInstruction | DecodeError::UnimplementedInstruction => false,
            DecodeError::MalformedInstruction | DecodeError::Unknown => true,
        }
    }
}

/// Errors from the layers built on top of the decoder: ROM header parsing, the preamble walker and listing files.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("listing encoding failed: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("ROM image is only {len} bytes, too small to contain a cartridge header")]
    RomTooSmall { len: usize },

    #[error("ROM image ended inside the entry point trampoline")]
    TruncatedEntryPoint,

    #[error("entry point does not end in an absolute jump (found opcode ${opcode:02x})")]
    EntryPointNotJump { opcode: u8 },

    #[error("decoding stopped at ${address:04x}: {source}")]
    Decode { address: u32, source: DecodeError },
}

pub type Result<T> = std::result::Result<T, Error>;
