/*
Copyright 2020 Anish Jewalikar

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Owns all mutable VM state.
//!
//! Structurally this plays the role a `CPU` struct plays in a classic
//! CHIP-8 core, reworked to use a packed [`Framebuffer`] instead of one
//! byte per pixel, a growable [`Stack`] instead of a fixed `[u16; 16]`, and
//! quirks pulled out into a standalone [`Config`] rather than inline bools.

use crate::config::Config;
use crate::decode::{decode, Operation};
use crate::error::{Error, Result};
use crate::font::{
    FONT_SPRITES, HIGH_RES_FONT_OFFSET, HIGH_RES_FONT_SPRITES, HIRES_DIGIT_LEN, LORES_DIGIT_LEN,
};
use crate::framebuffer::Framebuffer;
use crate::stack::Stack;

/// Size of addressable memory.
pub const MEMORY_SIZE: usize = 4096;

/// Address at which program space begins; everything below is reserved for
/// font data.
pub const PROGRAM_START: u16 = 0x200;

/// Largest ROM the interpreter will accept.
pub const MAX_ROM_LEN: usize = MEMORY_SIZE - PROGRAM_START as usize;

/// Number of general-purpose registers (`V0..VF`).
pub const NUM_REGISTERS: usize = 16;

/// Number of hex keys on the keypad.
pub const NUM_KEYS: usize = 16;

/// Number of RPL user flag bytes. 8, not 16, since `FX75`/`FX85` only ever
/// address `X <= 7`.
pub const NUM_RPL_FLAGS: usize = 8;

/// The full state of one (super) Chip-8 virtual machine.
#[derive(Debug, Clone)]
pub struct Machine {
    pub(crate) memory: Box<[u8; MEMORY_SIZE]>,
    pub(crate) framebuffer: Framebuffer,
    pub(crate) registers: [u8; NUM_REGISTERS],
    pub(crate) i: u16,
    pub(crate) dt: u8,
    pub(crate) st: u8,
    pub(crate) pc: u16,
    pub(crate) keypad: [bool; NUM_KEYS],
    pub(crate) stack: Stack,
    pub(crate) rpl_flags: [u8; NUM_RPL_FLAGS],
    pub(crate) hires: bool,
    pub(crate) stopped: bool,
    /// Scratch latch used only by the release-edge variant of `FX0A`;
    /// deliberately excluded from [`crate::diff`] comparisons and
    /// serialization.
    pub(crate) fx0a_latch: [bool; NUM_KEYS],
    pub(crate) config: Config,
}

impl Machine {
    /// Construct a freshly reset machine with the given configuration.
    pub fn new(config: Config) -> Self {
        let mut machine = Self {
            memory: Box::new([0u8; MEMORY_SIZE]),
            framebuffer: Framebuffer::new(),
            registers: [0; NUM_REGISTERS],
            i: 0,
            dt: 0,
            st: 0,
            pc: PROGRAM_START,
            keypad: [false; NUM_KEYS],
            stack: Stack::new(config.stack_limit),
            rpl_flags: [0; NUM_RPL_FLAGS],
            hires: false,
            stopped: false,
            fx0a_latch: [false; NUM_KEYS],
            config,
        };
        machine.load_builtin_fonts();
        machine
    }

    fn load_builtin_fonts(&mut self) {
        self.memory[0..FONT_SPRITES.len()].copy_from_slice(&FONT_SPRITES);
        let hi_start = HIGH_RES_FONT_OFFSET as usize;
        self.memory[hi_start..hi_start + HIGH_RES_FONT_SPRITES.len()]
            .copy_from_slice(&HIGH_RES_FONT_SPRITES);
    }

    /// Reset to the baseline lifecycle state: font loaded, everything else
    /// zeroed, `PC = 0x200`. Quirks configuration persists across a reset.
    pub fn reset(&mut self) {
        self.memory[PROGRAM_START as usize..].iter_mut().for_each(|b| *b = 0);
        self.registers = [0; NUM_REGISTERS];
        self.i = 0;
        self.dt = 0;
        self.st = 0;
        self.pc = PROGRAM_START;
        self.keypad = [false; NUM_KEYS];
        self.fx0a_latch = [false; NUM_KEYS];
        self.stack = Stack::new(self.config.stack_limit);
        self.framebuffer.clear();
        self.hires = false;
        self.stopped = false;
    }

    /// Load a ROM into program space. Rejects anything longer than the
    /// available 3584 bytes of program space.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<()> {
        if rom.len() > MAX_ROM_LEN {
            return Err(Error::RomTooLarge {
                len: rom.len(),
                max: MAX_ROM_LEN,
            });
        }

        let start = PROGRAM_START as usize;
        self.memory[start..start + rom.len()].copy_from_slice(rom);
        self.memory[start + rom.len()..].iter_mut().for_each(|b| *b = 0);
        Ok(())
    }

    /// Replace the built-in low-resolution font with a caller-supplied one.
    /// Must be exactly 80 bytes.
    pub fn load_font(&mut self, font: &[u8]) -> Result<()> {
        if font.len() != FONT_SPRITES.len() {
            return Err(Error::InvalidFont {
                len: font.len(),
                expected: FONT_SPRITES.len(),
            });
        }
        self.memory[0..font.len()].copy_from_slice(font);
        Ok(())
    }

    /// Replace the built-in high-resolution font. Must be exactly 160 bytes.
    pub fn load_high_res_font(&mut self, font: &[u8]) -> Result<()> {
        if font.len() != HIGH_RES_FONT_SPRITES.len() {
            return Err(Error::InvalidFont {
                len: font.len(),
                expected: HIGH_RES_FONT_SPRITES.len(),
            });
        }
        let start = HIGH_RES_FONT_OFFSET as usize;
        self.memory[start..start + font.len()].copy_from_slice(font);
        Ok(())
    }

    pub fn set_key(&mut self, index: usize, pressed: bool) {
        self.keypad[index] = pressed;
    }

    pub fn reset_keys(&mut self) {
        self.keypad = [false; NUM_KEYS];
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn is_high_res(&self) -> bool {
        self.hires
    }

    pub fn sound_timer(&self) -> u8 {
        self.st
    }

    pub fn delay_timer(&self) -> u8 {
        self.dt
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn index_register(&self) -> u16 {
        self.i
    }

    pub fn registers(&self) -> &[u8; NUM_REGISTERS] {
        &self.registers
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn memory(&self) -> &[u8; MEMORY_SIZE] {
        &self.memory
    }

    pub fn keypad(&self) -> &[bool; NUM_KEYS] {
        &self.keypad
    }

    /// Decrement the delay and sound timers if non-zero.
    pub fn step_timers(&mut self) {
        if self.dt > 0 {
            self.dt -= 1;
        }
        if self.st > 0 {
            self.st -= 1;
        }
    }

    /// Fetch, decode, and execute one instruction. Advances `PC` by 2
    /// before dispatch (per-instruction relative jumps build on that), and
    /// returns the raw opcode that ran so the caller can log/trace it.
    ///
    /// Does nothing and returns `Ok(None)` if the machine is halted (`00FD`).
    pub fn step(&mut self) -> Result<Option<u16>> {
        if self.stopped {
            return Ok(None);
        }

        let opcode = self.fetch_opcode();
        let pc_at_fetch = self.pc;
        self.pc = self.pc.wrapping_add(2);

        let op = decode(opcode);
        if let Operation::Unknown { opcode } = op {
            log::error!("unknown opcode {:#06x} at pc {:#06x}", opcode, pc_at_fetch);
            return Err(Error::UnknownOpcode {
                opcode,
                pc: pc_at_fetch,
            });
        }

        log::trace!("{:#06x}: {:?}", pc_at_fetch, op);
        self.execute(op)?;
        Ok(Some(opcode))
    }

    fn fetch_opcode(&self) -> u16 {
        u16::from_be_bytes([
            self.memory[self.pc as usize],
            self.memory[(self.pc as usize + 1) & 0xFFF],
        ])
    }

    fn execute(&mut self, op: Operation) -> Result<()> {
        match op {
            Operation::ScrollUp { n } => self.op_scroll_up(n),
            Operation::ScrollDown { n } => self.op_scroll_down(n),
            Operation::Clear => self.op_clear(),
            Operation::Return => self.op_return()?,
            Operation::ScrollRight => self.op_scroll_right(),
            Operation::ScrollLeft => self.op_scroll_left(),
            Operation::Halt => self.op_halt(),
            Operation::LoRes => self.op_lores(),
            Operation::HiRes => self.op_hires(),
            Operation::Jump { nnn } => self.op_jump(nnn),
            Operation::Call { nnn } => self.op_call(nnn)?,
            Operation::SkipEqImm { x, nn } => self.op_skip_eq_imm(x, nn),
            Operation::SkipNeImm { x, nn } => self.op_skip_ne_imm(x, nn),
            Operation::SkipEqReg { x, y } => self.op_skip_eq_reg(x, y),
            Operation::SkipNeReg { x, y } => self.op_skip_ne_reg(x, y),
            Operation::SetImm { x, nn } => self.op_set_imm(x, nn),
            Operation::AddImm { x, nn } => self.op_add_imm(x, nn),
            Operation::Move { x, y } => self.op_move(x, y),
            Operation::Or { x, y } => self.op_or(x, y),
            Operation::And { x, y } => self.op_and(x, y),
            Operation::Xor { x, y } => self.op_xor(x, y),
            Operation::Add { x, y } => self.op_add(x, y),
            Operation::Sub { x, y } => self.op_sub(x, y),
            Operation::Shr { x, y } => self.op_shr(x, y),
            Operation::Subn { x, y } => self.op_subn(x, y),
            Operation::Shl { x, y } => self.op_shl(x, y),
            Operation::SetIndex { nnn } => self.op_set_index(nnn),
            Operation::JumpOffset { x, nnn } => self.op_jump_offset(x, nnn),
            Operation::Rand { x, nn } => self.op_rand(x, nn),
            Operation::Draw { x, y, n } => self.op_draw(x, y, n),
            Operation::SkipKeyPressed { x } => self.op_skip_key_pressed(x),
            Operation::SkipKeyNotPressed { x } => self.op_skip_key_not_pressed(x),
            Operation::GetDelay { x } => self.op_get_delay(x),
            Operation::WaitKey { x } => self.op_wait_key(x),
            Operation::SetDelay { x } => self.op_set_delay(x),
            Operation::SetSound { x } => self.op_set_sound(x),
            Operation::AddIndex { x } => self.op_add_index(x),
            Operation::FontAddr { x } => self.op_font_addr(x),
            Operation::FontAddrHigh { x } => self.op_font_addr_high(x),
            Operation::Bcd { x } => self.op_bcd(x),
            Operation::StoreRegs { x } => self.op_store_regs(x),
            Operation::LoadRegs { x } => self.op_load_regs(x),
            Operation::StoreFlags { x } => self.op_store_flags(x),
            Operation::LoadFlags { x } => self.op_load_flags(x),
            Operation::Unknown { .. } => unreachable!("filtered out in step()"),
        }
        Ok(())
    }

    /// Centralizes the "write VF last" rule for `8XYk` arithmetic: the
    /// computed result always lands in `V[x]` before `V[0xF]` is overwritten
    /// with the flag, so `x == 0xF` observes the flag rather than the
    /// arithmetic result.
    pub(crate) fn set_with_flag(&mut self, x: usize, value: u8, flag: u8) {
        self.registers[x] = value;
        self.registers[0xF] = flag;
    }

    pub(crate) fn digit_sprite_len(&self, hires_digit: bool) -> u16 {
        if hires_digit {
            HIRES_DIGIT_LEN
        } else {
            LORES_DIGIT_LEN
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_preserves_config_but_clears_state() {
        let mut m = Machine::new(Config::default());
        m.registers[0] = 42;
        m.pc = 0x300;
        m.reset();
        assert_eq!(m.registers[0], 0);
        assert_eq!(m.pc, PROGRAM_START);
        assert_eq!(m.memory[0], FONT_SPRITES[0]);
    }

    #[test]
    fn load_rom_rejects_oversized_input() {
        let mut m = Machine::new(Config::default());
        let rom = vec![0u8; MAX_ROM_LEN + 1];
        assert!(matches!(
            m.load_rom(&rom),
            Err(Error::RomTooLarge { .. })
        ));
    }

    #[test]
    fn call_then_return_round_trips_pc() {
        let mut m = Machine::new(Config::default());
        m.memory[0x200] = 0x28;
        m.memory[0x201] = 0x00;
        m.memory[0x800] = 0x00;
        m.memory[0x801] = 0xEE;

        m.step().unwrap();
        assert_eq!(m.pc, 0x800);
        assert_eq!(m.stack.as_slice(), &[0x202]);

        m.step().unwrap();
        assert_eq!(m.pc, 0x202);
        assert!(m.stack.is_empty());
    }

    #[test]
    fn unknown_opcode_is_fatal() {
        let mut m = Machine::new(Config::default());
        m.memory[0x200] = 0x50;
        m.memory[0x201] = 0x01;
        assert!(matches!(m.step(), Err(Error::UnknownOpcode { .. })));
    }

    #[test]
    fn empty_return_underflows() {
        let mut m = Machine::new(Config::default());
        m.memory[0x200] = 0x00;
        m.memory[0x201] = 0xEE;
        assert!(matches!(m.step(), Err(Error::StackUnderflow)));
    }
}
