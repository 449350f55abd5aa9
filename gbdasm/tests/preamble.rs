use gbdasm::preamble::{self, CODE_END, ENTRY_POINT};
use gbdasm::{DecodeError, Error};
use lazy_static::lazy_static;

const CODE: [u8; 8] = [
    0x31, 0xFE, 0xFF, // ld sp, 0xfffe
    0xAF, // xor a
    0xE0, 0x40, // ld [0xff00 + 0x40], a
    0x18, 0xFE, // jr -2
];

lazy_static! {
    // A full 32KiB image of RST $38s, with a JP in the VBlank vector, the usual NOP/JP trampoline at $0100 and a few
    // real instructions at $0150.
    static ref ROM: Vec<u8> = {
        let mut rom = vec![0xFF; CODE_END as usize];
        rom[0x40..0x43].copy_from_slice(&[0xC3, 0x00, 0x02]);
        rom[0x100..0x104].copy_from_slice(&[0x00, 0xC3, 0x50, 0x01]);
        rom[0x150..0x158].copy_from_slice(&CODE);
        rom
    };
}

fn with(patches: &[(usize, &[u8])]) -> Vec<u8> {
    let mut rom = ROM.clone();
    for (offset, bytes) in patches {
        rom[*offset..*offset + bytes.len()].copy_from_slice(bytes);
    }
    rom
}

// Test that the vectors, trampoline and code are found and each stop where they should.
#[test]
fn walks_well_formed_rom() {
    let p = preamble::walk(&ROM).unwrap();

    assert_eq!(p.vectors.title, "RST and Interrupt table");
    assert_eq!(p.vectors.instructions.len(), 0x68 - 2);
    assert_eq!(p.vectors.instructions[0x40].tokens, vec!["jp", "0x0200"]);
    assert_eq!(p.vectors.instructions[0x41].address, 0x43);
    assert_eq!(p.vectors.instructions.last().unwrap().address, 0x67);

    assert_eq!(p.entry.title, "Code Entry Point (Trampoline)");
    let entry: Vec<String> = p.entry.instructions.iter().map(|i| i.tokens.join(" ")).collect();
    assert_eq!(entry, vec!["nop", "jp 0x0150"]);

    assert_eq!(p.code_start, 0x150);
    assert_eq!(p.code.title, "Code Start");
    let code: Vec<String> = p.code.instructions.iter().take(4).map(|i| i.to_string()).collect();
    assert_eq!(
        code,
        vec![
            "0x0150: 31feff       ld     sp, 0xfffe",
            "0x0153: af           xor    a",
            "0x0154: e040         ld     [0xff00 + 0x40], a",
            "0x0156: 18fe         jr     -2",
        ]
    );
    assert_eq!(p.code.instructions.len(), 4 + (CODE_END as usize - 0x158));
    assert_eq!(p.code.instructions.last().unwrap().address, CODE_END - 1);
}

// Test that the rendered walk has three titled sections separated by blank lines.
#[test]
fn renders_sections() {
    let text = preamble::walk(&ROM).unwrap().to_string();
    let headers: Vec<&str> = text.lines().filter(|l| l.starts_with("----")).collect();
    assert_eq!(headers.len(), 3);
    assert!(headers[1].contains("Code Entry Point (Trampoline)"));
    assert!(text.contains("\n\n---------------- Code Start"));
    assert!(text.contains("0x0101: c35001       jp     0x0150\n"));
}

// Test that an instruction cut off by the end of ROM space stops the walk and still shows what was decoded.
#[test]
fn truncated_code_aborts() {
    let rom = with(&[(CODE_END as usize - 2, &[0xCD])]);
    let partial = preamble::walk(&rom).unwrap_err();

    match partial.error {
        Error::Decode { address, source } => {
            assert_eq!(address, CODE_END - 2);
            assert_eq!(source, DecodeError::MalformedInstruction);
        }
        ref e => panic!("unexpected error {:?}", e),
    }

    assert_eq!(partial.sections.len(), 3);
    let last = partial.sections[2].instructions.last().unwrap();
    assert_eq!(last.raw_bytes, vec![0xCD, 0xFF]);
    assert!(partial.to_string().ends_with("Malformed Instruction\n"));
}

// Test that a trampoline ending in anything other than JP is rejected.
#[test]
fn entry_point_must_jump() {
    let rom = with(&[(ENTRY_POINT as usize, &[0x00, 0x18, 0x4E])]);
    let partial = preamble::walk(&rom).unwrap_err();

    match partial.error {
        Error::EntryPointNotJump { opcode } => assert_eq!(opcode, 0x18),
        ref e => panic!("unexpected error {:?}", e),
    }
    assert_eq!(partial.sections.len(), 2);
    assert_eq!(partial.sections[1].instructions.len(), 2);
}

// Test that an image which runs out in the middle of the trampoline is reported as such.
#[test]
fn image_ends_inside_trampoline() {
    let mut rom = vec![0x00; ENTRY_POINT as usize + 4];
    rom[..0x68].iter_mut().for_each(|b| *b = 0xC9);
    let partial = preamble::walk(&rom).unwrap_err();

    match partial.error {
        Error::TruncatedEntryPoint => {}
        ref e => panic!("unexpected error {:?}", e),
    }
    assert_eq!(partial.sections.len(), 1);
    assert_eq!(partial.sections[0].instructions.len(), 0x68);
}

// Test that a JP whose target was cut off is a truncated entry point rather than a jump to nowhere.
#[test]
fn jump_target_cut_off() {
    let rom = ROM[..ENTRY_POINT as usize + 3].to_vec();
    let partial = preamble::walk(&rom).unwrap_err();

    match partial.error {
        Error::TruncatedEntryPoint => {}
        ref e => panic!("unexpected error {:?}", e),
    }
    assert_eq!(partial.sections.len(), 2);
}
