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

//! The classic CHIP-8 instruction set, ported from the `0x0`
//! (clear/return only), `0x1`-`0x9`, `0xA`-`0xE`, and the non-SUPER-CHIP
//! `0xF` opcodes of `chip8_exec` in `original_source/src/chip8_exec.c`.

use crate::framebuffer::{DISPLAY_HEIGHT, DISPLAY_WIDTH, LORES_DOUBLE};
use crate::machine::Machine;

impl Machine {
    pub(crate) fn op_clear(&mut self) {
        self.framebuffer.clear();
    }

    pub(crate) fn op_return(&mut self) -> Result<(), crate::error::Error> {
        self.pc = self.stack.pop()?;
        Ok(())
    }

    pub(crate) fn op_jump(&mut self, nnn: u16) {
        self.pc = nnn;
    }

    pub(crate) fn op_call(&mut self, nnn: u16) -> Result<(), crate::error::Error> {
        self.stack.push(self.pc)?;
        self.pc = nnn;
        Ok(())
    }

    pub(crate) fn op_skip_eq_imm(&mut self, x: usize, nn: u8) {
        if self.registers[x] == nn {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    pub(crate) fn op_skip_ne_imm(&mut self, x: usize, nn: u8) {
        if self.registers[x] != nn {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    pub(crate) fn op_skip_eq_reg(&mut self, x: usize, y: usize) {
        if self.registers[x] == self.registers[y] {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    pub(crate) fn op_skip_ne_reg(&mut self, x: usize, y: usize) {
        if self.registers[x] != self.registers[y] {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    pub(crate) fn op_set_imm(&mut self, x: usize, nn: u8) {
        self.registers[x] = nn;
    }

    pub(crate) fn op_add_imm(&mut self, x: usize, nn: u8) {
        self.registers[x] = self.registers[x].wrapping_add(nn);
    }

    pub(crate) fn op_move(&mut self, x: usize, y: usize) {
        self.registers[x] = self.registers[y];
    }

    pub(crate) fn op_or(&mut self, x: usize, y: usize) {
        self.registers[x] |= self.registers[y];
    }

    pub(crate) fn op_and(&mut self, x: usize, y: usize) {
        self.registers[x] &= self.registers[y];
    }

    pub(crate) fn op_xor(&mut self, x: usize, y: usize) {
        self.registers[x] ^= self.registers[y];
    }

    pub(crate) fn op_add(&mut self, x: usize, y: usize) {
        let (sum, carry) = self.registers[x].overflowing_add(self.registers[y]);
        self.set_with_flag(x, sum, carry as u8);
    }

    pub(crate) fn op_sub(&mut self, x: usize, y: usize) {
        let (diff, borrow) = self.registers[x].overflowing_sub(self.registers[y]);
        self.set_with_flag(x, diff, !borrow as u8);
    }

    pub(crate) fn op_shr(&mut self, x: usize, y: usize) {
        let source = if self.config.shift_uses_vy { y } else { x };
        let value = self.registers[source];
        self.set_with_flag(x, value >> 1, value & 0x1);
    }

    pub(crate) fn op_subn(&mut self, x: usize, y: usize) {
        let (diff, borrow) = self.registers[y].overflowing_sub(self.registers[x]);
        self.set_with_flag(x, diff, !borrow as u8);
    }

    pub(crate) fn op_shl(&mut self, x: usize, y: usize) {
        let source = if self.config.shift_uses_vy { y } else { x };
        let value = self.registers[source];
        self.set_with_flag(x, value << 1, (value >> 7) & 0x1);
    }

    pub(crate) fn op_set_index(&mut self, nnn: u16) {
        self.i = nnn;
    }

    pub(crate) fn op_jump_offset(&mut self, x: usize, nnn: u16) {
        let base = if self.config.jump_uses_vx {
            self.registers[x] as u16
        } else {
            self.registers[0] as u16
        };
        self.pc = nnn.wrapping_add(base);
    }

    pub(crate) fn op_rand(&mut self, x: usize, nn: u8) {
        let r: u8 = rand::random();
        self.registers[x] = r & nn;
    }

    /// `DXYN`. Mirrors the unified hi/lo-res path in
    /// `chip8_exec_DXYN`: the sprite origin is scaled and wrapped to the
    /// physical surface once, up front, and every row/column beyond the
    /// physical edge is simply not drawn (clip, not wrap).
    pub(crate) fn op_draw(&mut self, x: usize, y: usize, n: u8) {
        let scale: usize = if self.hires { 1 } else { 2 };

        let vx = (scale * self.registers[x] as usize) % DISPLAY_WIDTH;
        let vy = (scale * self.registers[y] as usize) % DISPLAY_HEIGHT;

        let x_bytes = vx / 8;
        let x_bits = (vx % 8) as u8;

        let big_sprite = n == 0 && self.hires;
        let cols_px: usize = if big_sprite { 16 } else { 8 };
        let rows: usize = if big_sprite { 16 } else { n as usize };
        let cols_bytes = cols_px / 8;

        let x_limit_px = if cols_px * scale > DISPLAY_WIDTH - vx {
            (DISPLAY_WIDTH - vx) / scale
        } else {
            cols_px
        };
        let x_limit = (x_limit_px + 7) / 8;
        let y_limit = if rows * scale > DISPLAY_HEIGHT - vy {
            (DISPLAY_HEIGHT - vy) / scale
        } else {
            rows
        };

        self.registers[0xF] = 0;
        let mut collided = false;

        for j in 0..y_limit {
            for i in 0..x_limit {
                let mask = self.memory[(self.i as usize + j * cols_bytes + i) & 0xFFF];

                if self.hires {
                    collided |= self.framebuffer.apply_mask(x_bytes + i, x_bits, vy + j, mask);
                } else {
                    let hi = LORES_DOUBLE[(mask >> 4) as usize];
                    let lo = LORES_DOUBLE[(mask & 0xF) as usize];
                    let fb = &mut self.framebuffer;
                    collided |= fb.apply_mask(x_bytes + 2 * i, x_bits, vy + 2 * j, hi);
                    collided |= fb.apply_mask(x_bytes + 2 * i + 1, x_bits, vy + 2 * j, lo);
                    collided |= fb.apply_mask(x_bytes + 2 * i, x_bits, vy + 2 * j + 1, hi);
                    collided |= fb.apply_mask(x_bytes + 2 * i + 1, x_bits, vy + 2 * j + 1, lo);
                }
            }
        }

        if collided {
            self.registers[0xF] = 1;
        }
    }

    pub(crate) fn op_skip_key_pressed(&mut self, x: usize) {
        let key = (self.registers[x] & 0xF) as usize;
        if self.keypad[key] {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    pub(crate) fn op_skip_key_not_pressed(&mut self, x: usize) {
        let key = (self.registers[x] & 0xF) as usize;
        if !self.keypad[key] {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    pub(crate) fn op_get_delay(&mut self, x: usize) {
        self.registers[x] = self.dt;
    }

    /// `FX0A`. Does not advance `PC` when no resolving key is
    /// observed, which is exactly what makes the instruction "block": the
    /// next `step()` call re-fetches and re-decodes this same opcode.
    pub(crate) fn op_wait_key(&mut self, x: usize) {
        if self.config.wait_key_on_release {
            for key in 0..self.keypad.len() {
                if self.keypad[key] {
                    self.fx0a_latch[key] = true;
                } else if self.fx0a_latch[key] {
                    self.fx0a_latch = [false; 16];
                    self.registers[x] = key as u8;
                    self.pc = self.pc.wrapping_add(2);
                    return;
                }
            }
            self.pc = self.pc.wrapping_sub(2);
        } else {
            for (key, &pressed) in self.keypad.iter().enumerate() {
                if pressed {
                    self.registers[x] = key as u8;
                    self.pc = self.pc.wrapping_add(2);
                    return;
                }
            }
            self.pc = self.pc.wrapping_sub(2);
        }
    }

    pub(crate) fn op_set_delay(&mut self, x: usize) {
        self.dt = self.registers[x];
    }

    pub(crate) fn op_set_sound(&mut self, x: usize) {
        self.st = self.registers[x];
    }

    pub(crate) fn op_add_index(&mut self, x: usize) {
        self.i = (self.i + self.registers[x] as u16) & 0xFFF;
    }

    pub(crate) fn op_font_addr(&mut self, x: usize) {
        let digit = (self.registers[x] & 0xF) as u16;
        self.i = digit * self.digit_sprite_len(false);
    }

    pub(crate) fn op_bcd(&mut self, x: usize) {
        let mut value = self.registers[x];
        for offset in (0..3).rev() {
            self.memory[(self.i as usize + offset) & 0xFFF] = value % 10;
            value /= 10;
        }
    }

    /// `FX55`. `I` is left untouched unless
    /// [`crate::config::Config::load_store_increments_i`] opts in.
    pub(crate) fn op_store_regs(&mut self, x: usize) {
        let base = self.i as usize;
        for offset in 0..=x {
            self.memory[(base + offset) & 0xFFF] = self.registers[offset];
        }
        if self.config.load_store_increments_i {
            self.i += x as u16 + 1;
        }
    }

    pub(crate) fn op_load_regs(&mut self, x: usize) {
        let base = self.i as usize;
        for offset in 0..=x {
            self.registers[offset] = self.memory[(base + offset) & 0xFFF];
        }
        if self.config.load_store_increments_i {
            self.i += x as u16 + 1;
        }
    }
}
