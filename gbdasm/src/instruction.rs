//! The decoded instruction record and its one-line textual rendering.

use crate::error::DecodeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single decoded instruction. Created by `decode_one`, never modified afterwards.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Instruction {
    /// Offset of the first opcode byte. 32 bits wide so that banked ROM offsets fit.
    pub address: u32,
    /// Every byte consumed for this instruction, in stream order.
    #[serde(with = "serde_bytes")]
    pub raw_bytes: Vec<u8>,
    /// The mnemonic followed by its operands, destination first. May be incomplete if `error` is set.
    pub tokens: Vec<String>,
    pub error: Option<DecodeError>,
}

impl Instruction {
    pub fn mnemonic(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    pub fn operands(&self) -> &[String] {
        if self.tokens.is_empty() {
            &[]
        } else {
            &self.tokens[1..]
        }
    }

    pub fn opcode(&self) -> Option<u8> {
        self.raw_bytes.first().copied()
    }

    /// How many bytes of the stream this instruction consumed.
    pub fn len(&self) -> usize {
        self.raw_bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_bytes.is_empty()
    }

    /// Address of the byte immediately following this instruction.
    pub fn next_address(&self) -> u32 {
        self.address.wrapping_add(self.raw_bytes.len() as u32)
    }
}

/// Renders an instruction as `0xAAAA: <hex bytes> <mnemonic> <operands>`, objdump style. The hex column is 12
/// characters wide and the mnemonic column 6. Instructions that failed to decode show the error label in place of the
/// mnemonic.
pub fn render(inst: &Instruction) -> String {
    inst.to_string()
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let hex: String = self.raw_bytes.iter().map(|b| format!("{:02x}", b)).collect();

        match (&self.error, self.mnemonic()) {
            (None, Some(mnemonic)) => write!(
                f,
                "0x{:04x}: {:<12} {:<6} {}",
                self.address,
                hex,
                mnemonic,
                self.operands().join(", ")
            ),
            (Some(err), _) => write!(f, "0x{:04x}: {:<12} {:<6}", self.address, hex, err.to_string()),
            // Only reachable for hand-built records.
            (None, None) => write!(f, "0x{:04x}: {:<12} {:<6}", self.address, hex, DecodeError::Unknown.to_string()),
        }
    }
}
