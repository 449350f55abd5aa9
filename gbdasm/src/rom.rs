//! Utilities for extracting metadata from Gameboy ROM headers.
//!
//! The cartridge header lives at $0100-$014F, right after the RST/interrupt vectors. The disassembler doesn't need
//! any of it to decode instructions, but it's handy for identifying what's being looked at and for sanity checking
//! that the file really is a Gameboy ROM before walking its entry point.

use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder};

pub const HEADER_END: usize = 0x150;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CGBMode {
    None,
    BackwardsCompatible,
    CGBOnly,
}

#[derive(Clone, Debug)]
pub struct RomHeader {
    pub title: String,
    pub cgb_mode: CGBMode,
    pub supports_sgb: bool,
    pub cart_type: u8,
    /// Number of 16KB ROM banks, if the size byte is one we recognise.
    pub rom_banks: Option<usize>,
    /// Cartridge RAM in bytes, if the size byte is one we recognise.
    pub ram_size: Option<usize>,
    pub header_checksum: u8,
    pub computed_checksum: u8,
    pub global_checksum: u16,
}

impl RomHeader {
    pub fn parse(data: &[u8]) -> Result<RomHeader> {
        if data.len() < HEADER_END {
            return Err(Error::RomTooSmall { len: data.len() });
        }

        let computed_checksum = data[0x134..=0x14c]
            .iter()
            .fold(0u8, |acc, b| acc.wrapping_sub(*b).wrapping_sub(1));

        let cgb_mode = match data[0x143] {
            0x80 => CGBMode::BackwardsCompatible,
            0xC0 => CGBMode::CGBOnly,
            _ => CGBMode::None,
        };

        let mut title_range = 0x134..0x144;
        if cgb_mode != CGBMode::None {
            // CGB roms use the last byte of what used to be the title sequence to denote CGB mode.
            title_range.end -= 1;
        }

        let title = data[title_range]
            .split(|b| *b == 0)
            .next()
            .and_then(|v| std::str::from_utf8(v).ok())
            .unwrap_or("UNKNOWN")
            .to_string();

        let rom_banks = match data[0x148] {
            v @ 0..=8 => Some(2usize.pow(u32::from(v) + 1)),
            0x52 => Some(72),
            0x53 => Some(80),
            0x54 => Some(96),
            _ => None,
        };

        let ram_size = match data[0x149] {
            0 => Some(0),
            1 => Some(2048),
            2 => Some(8192),
            3 => Some(32768),
            4 => Some(131_072),
            5 => Some(65_536),
            _ => None,
        };

        Ok(RomHeader {
            title,
            cgb_mode,
            supports_sgb: data[0x146] == 3,
            cart_type: data[0x147],
            rom_banks,
            ram_size,
            header_checksum: data[0x14d],
            computed_checksum,
            global_checksum: BigEndian::read_u16(&data[0x14e..0x150]),
        })
    }

    pub fn checksum_ok(&self) -> bool {
        self.header_checksum == self.computed_checksum
    }

    /// Human readable name of the cartridge hardware, for the types that are common enough to be worth naming.
    pub fn cart_type_name(&self) -> &'static str {
        match self.cart_type {
            0x00 => "ROM ONLY",
            0x01 => "MBC1",
            0x02 => "MBC1+RAM",
            0x03 => "MBC1+RAM+BATTERY",
            0x05 => "MBC2",
            0x06 => "MBC2+BATTERY",
            0x0F => "MBC3+TIMER+BATTERY",
            0x10 => "MBC3+TIMER+RAM+BATTERY",
            0x11 => "MBC3",
            0x12 => "MBC3+RAM",
            0x13 => "MBC3+RAM+BATTERY",
            0x19 => "MBC5",
            0x1A => "MBC5+RAM",
            0x1B => "MBC5+RAM+BATTERY",
            _ => "UNKNOWN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_with(title: &[u8], cgb: u8) -> Vec<u8> {
        let mut rom = vec![0; 0x8000];
        rom[0x134..0x134 + title.len()].copy_from_slice(title);
        rom[0x143] = cgb;
        rom[0x147] = 0x01;
        rom[0x148] = 0x01;
        rom[0x149] = 0x02;
        rom[0x14e] = 0xAB;
        rom[0x14f] = 0xCD;
        let checksum = rom[0x134..=0x14c].iter().fold(0u8, |acc, b| acc.wrapping_sub(*b).wrapping_sub(1));
        rom[0x14d] = checksum;
        rom
    }

    #[test]
    fn parses_header_fields() {
        let rom = header_with(b"TETRIS", 0);
        let header = RomHeader::parse(&rom).unwrap();
        assert_eq!(header.title, "TETRIS");
        assert_eq!(header.cgb_mode, CGBMode::None);
        assert_eq!(header.cart_type_name(), "MBC1");
        assert_eq!(header.rom_banks, Some(4));
        assert_eq!(header.ram_size, Some(8192));
        assert_eq!(header.global_checksum, 0xABCD);
        assert!(header.checksum_ok());
    }

    #[test]
    fn cgb_title_is_one_byte_shorter() {
        let rom = header_with(b"ABCDEFGHIJKLMNO", 0x80);
        let header = RomHeader::parse(&rom).unwrap();
        assert_eq!(header.title, "ABCDEFGHIJKLMNO");
        assert_eq!(header.cgb_mode, CGBMode::BackwardsCompatible);
    }

    #[test]
    fn detects_bad_checksum() {
        let mut rom = header_with(b"X", 0);
        rom[0x14d] ^= 0xFF;
        assert!(!RomHeader::parse(&rom).unwrap().checksum_ok());
    }

    #[test]
    fn rejects_short_images() {
        match RomHeader::parse(&[0; 0x100]) {
            Err(Error::RomTooSmall { len }) => assert_eq!(len, 0x100),
            _ => panic!("expected RomTooSmall"),
        }
    }
}
