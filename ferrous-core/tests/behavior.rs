//! Integration tests covering concrete scenarios and quantified invariants,
//! driven entirely through the public `Machine` API by loading small
//! hand-assembled programs and stepping through them.

use ferrous_core::config::Config;
use ferrous_core::machine::Machine;

fn machine_with(rom: &[u8]) -> Machine {
    let mut machine = Machine::new(Config::default());
    machine.load_rom(rom).unwrap();
    machine
}

fn step_n(m: &mut Machine, n: usize) {
    for _ in 0..n {
        m.step().unwrap();
    }
}

#[test]
fn scenario_1_call_then_return() {
    // CALL 0x800 at 0x200; RET at 0x800.
    let mut rom = vec![0u8; 0x800 - 0x200 + 2];
    rom[0] = 0x28;
    rom[1] = 0x00;
    let ret_offset = 0x800 - 0x200;
    rom[ret_offset] = 0x00;
    rom[ret_offset + 1] = 0xEE;

    let mut m = machine_with(&rom);

    m.step().unwrap();
    assert_eq!(m.pc(), 0x800);

    m.step().unwrap();
    assert_eq!(m.pc(), 0x202);
}

#[test]
fn scenario_2_arithmetic_vf_ordering() {
    // VF := 0x0D; V5 := 0xFE; VF += V5 (8F54).
    let mut m = machine_with(&[0x6F, 0x0D, 0x65, 0xFE, 0x8F, 0x54]);
    step_n(&mut m, 3);
    assert_eq!(m.registers()[0xF], 1, "carry flag, not the wrapped sum 0x0B");
}

#[test]
fn scenario_3_sprite_wrap_of_origin_no_clip() {
    // V0 := 4; V1 := 1; I := &[0xFF, 0x0F]; DXYN with X=0,Y=1,N=2.
    let rom = [0x60, 0x04, 0x61, 0x01, 0xA2, 0x08, 0xD0, 0x12, 0xFF, 0x0F];
    let mut m = machine_with(&rom);
    step_n(&mut m, 4);

    assert_eq!(m.registers()[0xF], 0);
    let fb = m.framebuffer().as_bytes();
    let expected_set = [33usize, 34, 49, 50, 66, 82];
    for &index in &expected_set {
        assert_eq!(fb[index], 0xFF, "byte {index} should be set");
    }
    for (i, &byte) in fb.iter().enumerate() {
        if !expected_set.contains(&i) {
            assert_eq!(byte, 0, "byte {i} should be untouched");
        }
    }
}

#[test]
fn scenario_4_sprite_collision_hires() {
    let mut rom = vec![
        0x00, 0xFF, // hires on
        0x62, 0x00, // V2 := 0
        0x63, 0x00, // V3 := 0
        0x64, 0x78, // V4 := 120
        0x65, 0x3F, // V5 := 63
        0xA0, 0x00, // I := &ff_byte (patched below)
        0xD2, 0x31, // draw (V2, V3) height 1
        0xD4, 0x31, // draw (V4, V3) height 1
        0xD2, 0x51, // draw (V2, V5) height 1
        0xD4, 0x51, // draw (V4, V5) height 1
        0x60, 0x7C, // V0 := 124
        0x61, 0x3F, // V1 := 63
        0xA0, 0x00, // I := &pair (patched below)
        0xD0, 0x12, // draw (V0, V1) height 2
    ];
    let annn1 = 10;
    let annn2 = 22;

    let ff_addr = 0x200 + rom.len();
    rom.push(0xFF);
    let pair_addr = 0x200 + rom.len();
    rom.push(0xFF);
    rom.push(0xFF);

    rom[annn1] = 0xA0 | (((ff_addr >> 8) as u8) & 0x0F);
    rom[annn1 + 1] = (ff_addr & 0xFF) as u8;
    rom[annn2] = 0xA0 | (((pair_addr >> 8) as u8) & 0x0F);
    rom[annn2 + 1] = (pair_addr & 0xFF) as u8;

    let mut m = machine_with(&rom);
    step_n(&mut m, 14);

    assert_eq!(m.framebuffer().as_bytes()[1023], 0xF0);
    assert_eq!(m.registers()[0xF], 1);
}

#[test]
fn scenario_5_bcd() {
    // V1 := 154; I := 0x210; BCD V1.
    let mut rom = vec![0u8; 0x13];
    rom[0] = 0x61;
    rom[1] = 154;
    rom[2] = 0xA2;
    rom[3] = 0x10;
    rom[4] = 0xF1;
    rom[5] = 0x33;

    let mut m = machine_with(&rom);
    step_n(&mut m, 3);

    assert_eq!(&m.memory()[0x210..0x213], &[1, 5, 4]);
}

#[test]
fn scroll_right_by_4_at_the_opcode_dispatch_level() {
    let mut rom = vec![
        0x00, 0xFF, // hires on
        0x62, 0x00, // V2 := 0
        0x63, 0x00, // V3 := 0
        0x64, 0x78, // V4 := 120
        0x65, 0x3F, // V5 := 63
        0xA0, 0x00, // I := &ff_byte (patched below)
        0xD2, 0x31, 0xD4, 0x31, 0xD2, 0x51, 0xD4, 0x51, // draw the 4 corners
        0x00, 0xFB, // scroll right by a nibble
    ];
    let annn = 10;
    let ff_addr = 0x200 + rom.len();
    rom.push(0xFF);
    rom[annn] = 0xA0 | (((ff_addr >> 8) as u8) & 0x0F);
    rom[annn + 1] = (ff_addr & 0xFF) as u8;

    let mut m = machine_with(&rom);
    step_n(&mut m, 9);

    let fb = m.framebuffer().as_bytes();
    assert_eq!(fb[0], 0x0F);
    assert_eq!(fb[1], 0xF0);
    assert_eq!(fb[15], 0x0F);
    assert_eq!(fb[1008], 0x0F);
    assert_eq!(fb[1009], 0xF0);
    assert_eq!(fb[1023], 0x0F);
}

#[test]
fn invariant_add_index_masks_to_12_bits() {
    // I := 0xFFF; V0 := 0xFF; I += V0.
    let mut m = machine_with(&[0xAF, 0xFF, 0x60, 0xFF, 0xF0, 0x1E]);
    step_n(&mut m, 3);
    assert_eq!(m.index_register() & 0xF000, 0);
}

#[test]
fn fx0a_blocks_until_a_key_is_pressed() {
    let mut m = machine_with(&[0xF0, 0x0A]);

    m.step().unwrap();
    assert_eq!(m.pc(), 0x200, "should re-fetch the same instruction");

    m.set_key(0x7, true);
    m.step().unwrap();
    assert_eq!(m.pc(), 0x202);
    assert_eq!(m.registers()[0], 0x7);
}

#[test]
fn unknown_opcode_is_reported_with_its_pc() {
    let mut m = machine_with(&[0x50, 0x01]);
    let err = m.step().unwrap_err();
    match err {
        ferrous_core::error::Error::UnknownOpcode { opcode, pc } => {
            assert_eq!(opcode, 0x5001);
            assert_eq!(pc, 0x200);
        }
        other => panic!("expected UnknownOpcode, got {other:?}"),
    }
}

#[test]
fn stack_overflow_is_reported_when_limit_configured() {
    let mut config = Config::default();
    config.stack_limit = Some(1);
    let mut m = Machine::new(config);
    // CALL 0x200 twice in a row; the second exceeds the configured depth.
    m.load_rom(&[0x22, 0x00]).unwrap();

    m.step().unwrap();
    let err = m.step().unwrap_err();
    assert!(matches!(
        err,
        ferrous_core::error::Error::StackOverflow { limit: 1 }
    ));
}
