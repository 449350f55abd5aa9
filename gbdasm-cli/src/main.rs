use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use gbdasm::preamble::{self, Section};
use gbdasm::{disassemble_range, Error, Instruction, Listing, Outcome, RomHeader};
use log::{info, warn};
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufWriter, Cursor};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "gbdasm")]
#[command(about = "Disassembles Gameboy ROM images", long_about = None)]
struct Args {
    /// Path to the ROM image
    rom: PathBuf,

    /// Disassemble from this address instead of following the entry point (hex with 0x prefix, or decimal)
    #[arg(long, value_parser = parse_address)]
    start: Option<u32>,

    /// Stop before this address when --start is given
    #[arg(long, value_parser = parse_address, default_value = "0x8000")]
    end: u32,

    /// Print the cartridge header before the disassembly
    #[arg(long, action = ArgAction::SetTrue)]
    header: bool,

    /// Also write the decoded instructions to this file in bincode form
    #[arg(long)]
    save_listing: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_address(s: &str) -> std::result::Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid address {:?}: {}", s, e))
}

fn print_header(header: &RomHeader) {
    println!("; title:     {}", header.title);
    println!("; cartridge: {} (${:02x})", header.cart_type_name(), header.cart_type);
    match header.rom_banks {
        Some(banks) => println!("; rom banks: {}", banks),
        None => println!("; rom banks: unknown"),
    }
    match header.ram_size {
        Some(size) => println!("; ram size:  {}", size),
        None => println!("; ram size:  unknown"),
    }
    println!(
        "; checksum:  ${:02x} ({})",
        header.header_checksum,
        if header.checksum_ok() { "ok" } else { "mismatch" }
    );
    println!();
}

fn save_listing(path: &Path, listing: &Listing) -> Result<()> {
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    listing.save(BufWriter::new(f)).with_context(|| format!("writing {}", path.display()))?;
    info!("wrote {} instructions to {}", listing.instructions.len(), path.display());
    Ok(())
}

fn flatten(sections: &[Section]) -> Vec<Instruction> {
    sections.iter().flat_map(|s| s.instructions.iter().cloned()).collect()
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut f = File::open(&args.rom).with_context(|| format!("opening {}", args.rom.display()))?;
    let mut rom = Vec::new();
    f.read_to_end(&mut rom).with_context(|| format!("reading {}", args.rom.display()))?;
    info!("loaded {} bytes from {}", rom.len(), args.rom.display());

    match RomHeader::parse(&rom) {
        Ok(header) => {
            info!("cartridge title: {}", header.title);
            if !header.checksum_ok() {
                warn!(
                    "header checksum mismatch: stored ${:02x}, computed ${:02x}",
                    header.header_checksum, header.computed_checksum
                );
            }
            if args.header {
                print_header(&header);
            }
        }
        Err(e) if args.header => return Err(e).context("reading cartridge header"),
        Err(e) => warn!("{}", e),
    }

    if let Some(start) = args.start {
        let mut rdr = Cursor::new(&rom[..]);
        rdr.set_position(u64::from(start));
        let listing = disassemble_range(rdr, start, args.end);
        print!("{}", listing.render());

        if let Some(path) = &args.save_listing {
            save_listing(path, &listing)?;
        }
        if let Outcome::Aborted { address, error } = listing.outcome {
            bail!("decoding stopped at ${:04x}: {}", address, error);
        }
        return Ok(());
    }

    match preamble::walk(&rom) {
        Ok(p) => {
            print!("{}", p);
            if let Some(path) = &args.save_listing {
                let sections = [p.vectors, p.entry, p.code];
                save_listing(path, &Listing { instructions: flatten(&sections), outcome: Outcome::Completed })?;
            }
            Ok(())
        }
        Err(partial) => {
            print!("{}", partial);
            if let Some(path) = &args.save_listing {
                let outcome = match &partial.error {
                    Error::Decode { address, source } => Outcome::Aborted { address: *address, error: *source },
                    _ => Outcome::Completed,
                };
                save_listing(path, &Listing { instructions: flatten(&partial.sections), outcome })?;
            }
            Err(partial.error).context("walking ROM entry point")
        }
    }
}
