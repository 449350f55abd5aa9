//! A disassembler for the Gameboy's CPU, the Sharp LR35902: an 8-bit Z80-alike with the Z80's port I/O, index
//! registers, alternate register set and ED-prefixed extensions removed, and a handful of Gameboy specific loads
//! added in their place.
//!
//! The heart of the crate is `decode_one`, which reads a single instruction from any `std::io::Read` and returns a
//! self-contained `Instruction` record: where it lives, which bytes it was made of, and its mnemonic/operand tokens
//! (or the reason it couldn't be decoded). Everything else is built on top of that call:
//!
//! - `listing` walks a stream instruction by instruction and decides when to stop.
//! - `preamble` knows the fixed layout of a cartridge and follows it from the vectors to the start of the program.
//! - `rom` reads the cartridge header.

pub mod decode;
pub mod error;
pub mod instruction;
pub mod listing;
pub mod operands;
pub mod preamble;
pub mod rom;
pub mod tables;

pub use decode::{decode_one, decode_slice};
pub use error::{DecodeError, Error, Result};
pub use instruction::{render, Instruction};
pub use listing::{disassemble_range, Disassembler, Listing, Outcome};
pub use preamble::{walk, PartialPreamble, Preamble, Section};
pub use rom::RomHeader;
