//! The in-progress state of a single decode: the stream being read, every byte consumed so far, and the display
//! tokens built so far. Operand readers pull bytes from the stream, record them and hand back the rendered operand.

use crate::error::DecodeError;
use crate::instruction::Instruction;
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::io::Read;

pub struct Decoder<'a, R: Read> {
    stream: &'a mut R,
    raw: Vec<u8>,
    tokens: Vec<String>,
}

impl<'a, R: Read> Decoder<'a, R> {
    pub fn new(stream: &'a mut R) -> Decoder<'a, R> {
        Decoder {
            stream,
            raw: Vec::with_capacity(4),
            tokens: Vec::with_capacity(4),
        }
    }

    #[cfg(test)]
    fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Reads the next byte of the instruction.
    pub fn fetch(&mut self) -> Result<u8, DecodeError> {
        let v = self.stream.read_u8().map_err(|e| DecodeError::from_io(&e))?;
        self.raw.push(v);
        Ok(v)
    }

    fn fetch16(&mut self) -> Result<u16, DecodeError> {
        let lo = self.fetch()?;
        let hi = self.fetch()?;
        Ok(LittleEndian::read_u16(&[lo, hi]))
    }

    /// Unsigned 8-bit immediate, rendered as `0xNN`.
    pub fn imm8(&mut self) -> Result<String, DecodeError> {
        Ok(format!("0x{:02x}", self.fetch()?))
    }

    /// Signed 8-bit immediate (relative jumps, SP offsets), rendered in decimal.
    pub fn simm8(&mut self) -> Result<String, DecodeError> {
        Ok(format!("{}", self.fetch()? as i8))
    }

    /// Little endian 16-bit immediate, rendered high byte first as `0xNNNN`.
    pub fn imm16(&mut self) -> Result<String, DecodeError> {
        Ok(format!("0x{:04x}", self.fetch16()?))
    }

    /// Little endian 16-bit immediate used as a memory address, rendered as `[0xNNNN]`.
    pub fn addr16(&mut self) -> Result<String, DecodeError> {
        Ok(format!("[0x{:04x}]", self.fetch16()?))
    }

    pub fn emit<S: Into<String>>(&mut self, token: S) {
        self.tokens.push(token.into());
    }

    pub fn emit_all(&mut self, tokens: &[&str]) {
        self.tokens.extend(tokens.iter().map(|t| t.to_string()));
    }

    /// Hands the consumed bytes and tokens over to an immutable instruction record.
    pub fn finish(self, address: u32, result: Result<(), DecodeError>) -> Instruction {
        Instruction {
            address,
            raw_bytes: self.raw,
            tokens: self.tokens,
            error: result.err(),
        }
    }
}
